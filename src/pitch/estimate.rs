use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PitchEstimate {
    pub frequency_hz: f64,
    pub clarity: f64,
}

impl PitchEstimate {
    pub fn new(frequency_hz: f64, clarity: f64) -> Self {
        PitchEstimate {
            frequency_hz,
            clarity,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct PitchGate {
    pub min_clarity: f64,
    pub min_pitch_hz: f64,
}

impl Default for PitchGate {
    fn default() -> Self {
        PitchGate {
            min_clarity: 0.9,
            min_pitch_hz: 60.0,
        }
    }
}

impl PitchGate {
    pub fn accept(&self, estimate: &PitchEstimate) -> Option<f64> {
        let f = estimate.frequency_hz;
        if !f.is_finite() || f <= 0.0 {
            return None;
        }
        if estimate.clarity < self.min_clarity || f < self.min_pitch_hz {
            return None;
        }
        Some(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_accepts_clear_pitch() {
        let gate = PitchGate::default();
        assert_eq!(gate.accept(&PitchEstimate::new(440.0, 0.95)), Some(440.0));
    }

    #[test]
    fn test_gate_rejects_low_clarity() {
        let gate = PitchGate::default();
        assert!(gate.accept(&PitchEstimate::new(440.0, 0.5)).is_none());
    }

    #[test]
    fn test_gate_rejects_rumble_and_garbage() {
        let gate = PitchGate::default();
        assert!(gate.accept(&PitchEstimate::new(30.0, 0.99)).is_none());
        assert!(gate.accept(&PitchEstimate::new(0.0, 1.0)).is_none());
        assert!(gate.accept(&PitchEstimate::new(f64::NAN, 1.0)).is_none());
    }
}
