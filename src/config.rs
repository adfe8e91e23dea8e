use serde::{Deserialize, Serialize};

use crate::error::{Result, ViolinError};
use crate::fingering::chart::{Preference, Tuning};
use crate::pitch::estimate::PitchGate;
use crate::pitch::math::A4_HZ;
use crate::tracker::pose::{Pose, Quat, Vec3};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn bow_hand_buttons(self) -> (&'static str, &'static str) {
        match self.other() {
            Side::Left => ("y", "x"),
            Side::Right => ("b", "a"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ViolinConfig {
    pub reference_hz: f64,
    /// Allowed offset, as a fraction of a semitone, before a note is flat or sharp.
    pub offset_tolerance: f64,
    pub min_clarity: f64,
    pub min_pitch_hz: f64,
    pub tuning: Option<Tuning>,
    pub frets_per_string: usize,
    pub preference: Preference,
    pub side: Side,
    pub track_hand_frame: bool,
    pub pitch_interval_ms: f64,
    /// Whitespace separated note names; the open-strings preset when unset.
    pub song: Option<String>,
    pub default_position: [f64; 3],
}

impl Default for ViolinConfig {
    fn default() -> Self {
        ViolinConfig {
            reference_hz: A4_HZ,
            offset_tolerance: 0.1,
            min_clarity: 0.9,
            min_pitch_hz: 60.0,
            tuning: None,
            frets_per_string: 12,
            preference: Preference::FirstFound,
            side: Side::Left,
            track_hand_frame: false,
            pitch_interval_ms: 50.0,
            song: None,
            default_position: [0.0, 1.2, -0.4],
        }
    }
}

impl ViolinConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.reference_hz.is_finite() || self.reference_hz <= 0.0 {
            return Err(invalid("reference_hz", format!("must be positive, got {}", self.reference_hz)));
        }
        if !self.offset_tolerance.is_finite() || self.offset_tolerance < 0.0 {
            return Err(invalid(
                "offset_tolerance",
                format!("must be non-negative, got {}", self.offset_tolerance),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_clarity) {
            return Err(invalid("min_clarity", format!("must be within [0, 1], got {}", self.min_clarity)));
        }
        if !self.min_pitch_hz.is_finite() || self.min_pitch_hz < 0.0 {
            return Err(invalid("min_pitch_hz", format!("must be non-negative, got {}", self.min_pitch_hz)));
        }
        if self.frets_per_string == 0 {
            return Err(invalid("frets_per_string", "must be at least 1".to_string()));
        }
        if !self.pitch_interval_ms.is_finite() || self.pitch_interval_ms < 0.0 {
            return Err(invalid(
                "pitch_interval_ms",
                format!("must be non-negative, got {}", self.pitch_interval_ms),
            ));
        }
        // Deserialization checks the tuning, but a struct literal can bypass it.
        if let Some(tuning) = &self.tuning {
            Tuning::new(*tuning.open_strings())?;
        }
        Ok(())
    }

    pub fn tuning(&self) -> Tuning {
        self.tuning.unwrap_or_else(|| Tuning::violin(self.reference_hz))
    }

    pub fn pitch_gate(&self) -> PitchGate {
        PitchGate {
            min_clarity: self.min_clarity,
            min_pitch_hz: self.min_pitch_hz,
        }
    }

    pub fn default_pose(&self) -> Pose {
        Pose::new(Vec3::from_array(self.default_position), Quat::IDENTITY)
    }
}

fn invalid(field: &'static str, message: String) -> ViolinError {
    ViolinError::InvalidConfig { field, message }
}
