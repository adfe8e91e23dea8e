pub mod pose;
pub mod relative;

pub use pose::{Pose, Quat, Vec3};
pub use relative::{RelativeTransformTracker, TrackerState};
