use log::{debug, warn};
use serde::Serialize;

use crate::tracker::pose::{Pose, Quat, Vec3};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// The persisted starting pose has not arrived yet.
    Unloaded,
    Idle,
    Tracking,
}

#[derive(Clone, Copy, Debug)]
struct GrabSession {
    anchor_controller_position: Vec3,
    anchor_controller_orientation_inverse: Quat,
    anchor_object_position: Vec3,
    orientation_delta: Quat,
}

/// Drives an object from controller motion relative to where the grab began.
///
/// Position re-anchors on every grab. Orientation deltas chain across grabs,
/// so releasing and grabbing again never snaps the object back.
#[derive(Clone, Debug)]
pub struct RelativeTransformTracker {
    track_hand_frame: bool,
    loaded: bool,
    pose: Pose,
    session: Option<GrabSession>,
    /// Accumulated orientation of all finished sessions.
    prior_orientation_delta: Quat,
    /// Delta of the last finished session, folded in at the next grab.
    released_delta: Option<Quat>,
}

impl RelativeTransformTracker {
    pub fn new(track_hand_frame: bool) -> Self {
        RelativeTransformTracker {
            track_hand_frame,
            loaded: false,
            pose: Pose::default(),
            session: None,
            prior_orientation_delta: Quat::IDENTITY,
            released_delta: None,
        }
    }

    pub fn load_initial_pose(&mut self, pose: Pose) {
        let orientation = pose.orientation.normalize();
        self.pose = Pose::new(pose.position, orientation);
        self.prior_orientation_delta = orientation;
        self.released_delta = None;
        self.session = None;
        self.loaded = true;
        debug!("tracker loaded initial pose {:?}", self.pose);
    }

    pub fn state(&self) -> TrackerState {
        match (self.loaded, self.session.is_some()) {
            (false, _) => TrackerState::Unloaded,
            (true, false) => TrackerState::Idle,
            (true, true) => TrackerState::Tracking,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_grabbed(&self) -> bool {
        self.session.is_some()
    }

    /// Captures the anchors for a new session. Ignored before the initial
    /// pose is loaded; returns whether a session started. A repeated start
    /// ends the live session first.
    pub fn grab_start(&mut self, controller: &Pose) -> bool {
        if !self.loaded {
            warn!("grab ignored: initial pose not loaded yet");
            return false;
        }
        if self.session.is_some() {
            self.grab_end();
        }
        if let Some(released) = self.released_delta.take() {
            self.prior_orientation_delta = (released * self.prior_orientation_delta).normalize();
        }
        self.session = Some(GrabSession {
            anchor_controller_position: controller.position,
            anchor_controller_orientation_inverse: controller.orientation.inverse(),
            anchor_object_position: self.pose.position,
            orientation_delta: Quat::IDENTITY,
        });
        debug!("grab started at {:?}", controller.position);
        true
    }

    pub fn tick(&mut self, controller: &Pose, hand_orientation: Option<Quat>) -> Option<Pose> {
        if !self.loaded {
            return None;
        }
        let session = self.session.as_mut()?;

        let hand_inverse = match (self.track_hand_frame, hand_orientation) {
            (true, Some(hand)) => hand.inverse(),
            _ => Quat::IDENTITY,
        };

        let offset = controller.position - session.anchor_controller_position;
        let position = hand_inverse.rotate(offset) + session.anchor_object_position;

        session.orientation_delta = session.anchor_controller_orientation_inverse * controller.orientation;
        let orientation = (hand_inverse * session.orientation_delta * self.prior_orientation_delta).normalize();

        self.pose = Pose::new(position, orientation);
        Some(self.pose)
    }

    pub fn grab_end(&mut self) {
        if let Some(session) = self.session.take() {
            self.released_delta = Some(session.orientation_delta);
            debug!("grab ended at {:?}", self.pose.position);
        }
    }
}
