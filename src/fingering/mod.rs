pub mod chart;

pub use chart::{FingerPosition, FingeringChart, Preference, Tuning, STRING_COUNT};
