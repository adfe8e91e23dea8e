use serde::{Deserialize, Serialize};

use crate::fingering::chart::{FingerPosition, FingeringChart};
use crate::pitch::math::{cents_offset, frequency_to_midi, midi_to_note_name, round_half_up, NoteName};

/// Float slack applied at the tolerance boundary so a pitch exactly at the
/// tolerance is reported in tune.
const TOLERANCE_EPSILON: f64 = 1e-9;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Flat,
    InTune,
    Sharp,
}

impl Severity {
    pub fn classify(offset: f64, tolerance: f64) -> Self {
        if offset.abs() > tolerance + TOLERANCE_EPSILON {
            if offset > 0.0 {
                Severity::Sharp
            } else {
                Severity::Flat
            }
        } else {
            Severity::InTune
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub note_name: NoteName,
    pub pitch_hz: f64,
    pub string_index: usize,
    pub fret_index: usize,
    /// Fraction of a semitone, corrected by whole semitones toward the
    /// target position.
    pub offset: f64,
    pub severity: Severity,
}

impl Evaluation {
    pub fn position(&self) -> FingerPosition {
        FingerPosition::new(self.string_index, self.fret_index)
    }

    pub fn display_offset(&self) -> f64 {
        self.offset * 100.0
    }
}

#[derive(Clone, Debug)]
pub struct IntonationEngine {
    chart: FingeringChart,
    reference_hz: f64,
    offset_tolerance: f64,
}

impl IntonationEngine {
    pub fn new(chart: FingeringChart, reference_hz: f64, offset_tolerance: f64) -> Self {
        IntonationEngine {
            chart,
            reference_hz,
            offset_tolerance,
        }
    }

    pub fn chart(&self) -> &FingeringChart {
        &self.chart
    }

    pub fn reference_hz(&self) -> f64 {
        self.reference_hz
    }

    pub fn offset_tolerance(&self) -> f64 {
        self.offset_tolerance
    }

    pub fn evaluate(&self, pitch: f64, target_fret: usize) -> Option<Evaluation> {
        let pitch_midi = frequency_to_midi(pitch, self.reference_hz)?;
        let note_name = midi_to_note_name(pitch_midi)?;
        let string_index = self.chart.closest_string_index(pitch, target_fret)?;
        let raw_offset = cents_offset(pitch, self.reference_hz)?;

        let target = FingerPosition::new(string_index, target_fret);
        let target_frequency = self.chart.frequency(target)?;
        let target_midi = frequency_to_midi(target_frequency, self.reference_hz)?;
        let midi_offset = round_half_up(target_midi) - round_half_up(pitch_midi);

        let offset = raw_offset + midi_offset;
        Some(Evaluation {
            note_name,
            pitch_hz: pitch,
            string_index,
            fret_index: target_fret,
            offset,
            severity: Severity::classify(offset, self.offset_tolerance),
        })
    }

    pub fn evaluate_open_string(&self, pitch: f64) -> Option<Evaluation> {
        self.evaluate(pitch, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingering::chart::Tuning;

    fn engine(tolerance: f64) -> IntonationEngine {
        let chart = FingeringChart::build(&Tuning::default(), 12);
        IntonationEngine::new(chart, 440.0, tolerance)
    }

    fn semitones_above(f: f64, semitones: f64) -> f64 {
        f * 2f64.powf(semitones / 12.0)
    }

    #[test]
    fn test_exact_open_a() {
        let result = engine(0.1).evaluate(440.0, 0).unwrap();
        assert_eq!(result.note_name.to_string(), "A4");
        assert_eq!(result.string_index, 2);
        assert!(result.offset.abs() < 1e-9);
        assert_eq!(result.severity, Severity::InTune);
    }

    #[test]
    fn test_quarter_sharp_against_tolerance() {
        let pitch = semitones_above(440.0, 0.25);
        let strict = engine(0.2).evaluate(pitch, 0).unwrap();
        assert!((strict.offset - 0.25).abs() < 1e-9);
        assert_eq!(strict.severity, Severity::Sharp);

        let lenient = engine(0.25).evaluate(pitch, 0).unwrap();
        assert_eq!(lenient.severity, Severity::InTune);
    }

    #[test]
    fn test_quarter_flat() {
        let pitch = semitones_above(440.0, -0.25);
        let result = engine(0.1).evaluate(pitch, 0).unwrap();
        assert!((result.offset + 0.25).abs() < 1e-9);
        assert_eq!(result.severity, Severity::Flat);
    }

    #[test]
    fn test_fretted_target() {
        // B4 is the 2nd fret on the A string
        let b4 = semitones_above(440.0, 2.0);
        let result = engine(0.1).evaluate(b4, 2).unwrap();
        assert_eq!(result.string_index, 2);
        assert_eq!(result.note_name.to_string(), "B4");
        assert!(result.offset.abs() < 1e-9);
    }

    #[test]
    fn test_whole_semitone_correction() {
        // Playing A#4 while aiming for the open A string
        let a_sharp = semitones_above(440.0, 1.1);
        let result = engine(0.1).evaluate(a_sharp, 0).unwrap();
        assert_eq!(result.string_index, 2);
        // raw 0.1, target 69 minus played 70
        assert!((result.offset - (0.1 - 1.0)).abs() < 1e-9);
        assert_eq!(result.severity, Severity::Flat);
    }

    #[test]
    fn test_invalid_input() {
        let e = engine(0.1);
        assert!(e.evaluate(0.0, 0).is_none());
        assert!(e.evaluate(-5.0, 0).is_none());
        assert!(e.evaluate(440.0, 40).is_none());
    }

    #[test]
    fn test_display_offset_is_percent_of_semitone() {
        let pitch = semitones_above(440.0, 0.3);
        let result = engine(0.1).evaluate(pitch, 0).unwrap();
        assert!((result.display_offset() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let e = engine(0.1);
        let a = e.evaluate(452.0, 0).unwrap();
        let b = e.evaluate(452.0, 0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_open_string_helper() {
        let e = engine(0.1);
        let result = e.evaluate_open_string(197.0).unwrap();
        assert_eq!(result.string_index, 0);
        assert_eq!(result.fret_index, 0);
        assert_eq!(result.severity, Severity::InTune);
    }
}
