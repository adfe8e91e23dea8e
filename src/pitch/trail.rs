use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub time: f64,
    pub value: f64,
}

/// A recording of detected pitch and input volume over time, used to draw
/// the pitch history behind the live readout.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PitchTrail {
    pub pitch: Vec<TrailPoint>,
    pub volume: Vec<TrailPoint>,
}

impl PitchTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_pitch(&mut self, time: f64, hz: f64) {
        self.pitch.push(TrailPoint { time, value: hz });
    }

    pub fn push_volume(&mut self, time: f64, volume: f64) {
        self.volume.push(TrailPoint {
            time,
            value: volume.clamp(0.0, 1.0),
        });
    }

    pub fn clear(&mut self) {
        self.pitch.clear();
        self.volume.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pitch.is_empty() && self.volume.is_empty()
    }

    pub fn pitch_at(&self, time: f64) -> f64 {
        value_at(&self.pitch, time)
    }

    pub fn volume_at(&self, time: f64) -> f64 {
        value_at(&self.volume, time)
    }
}

fn adjacent(points: &[TrailPoint], time: f64) -> (Option<&TrailPoint>, Option<&TrailPoint>) {
    let after_idx = points.iter().position(|p| p.time > time);
    let before = points[..after_idx.unwrap_or(points.len())]
        .iter()
        .rev()
        .find(|p| p.time < time);
    (before, after_idx.map(|i| &points[i]))
}

/// Linearly interpolated value at `time`; holds the end values outside the
/// recorded range and returns 0 for an empty recording.
pub fn value_at(points: &[TrailPoint], time: f64) -> f64 {
    if let Some(exact) = points.iter().find(|p| p.time == time) {
        return exact.value;
    }
    match adjacent(points, time) {
        (Some(before), Some(after)) => {
            let t = (time - before.time) / (after.time - before.time);
            before.value + (after.value - before.value) * t
        }
        (Some(only), None) | (None, Some(only)) => only.value,
        (None, None) => 0.0,
    }
}
