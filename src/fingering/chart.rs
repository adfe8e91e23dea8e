use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViolinError};
use crate::pitch::math::{frequency_to_midi, midi_to_frequency, midi_to_note_name, transpose, NoteName, A4_HZ};

pub const STRING_COUNT: usize = 4;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Tuning([f64; STRING_COUNT]);

impl Tuning {
    pub fn new(open_strings: [f64; STRING_COUNT]) -> Result<Self> {
        if open_strings.iter().any(|f| !f.is_finite() || *f <= 0.0) {
            return Err(ViolinError::InvalidTuning(format!(
                "frequencies must be positive: {:?}",
                open_strings
            )));
        }
        if open_strings.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ViolinError::InvalidTuning(format!(
                "frequencies must be strictly increasing: {:?}",
                open_strings
            )));
        }
        Ok(Tuning(open_strings))
    }

    pub fn violin(reference_hz: f64) -> Self {
        Tuning([55.0, 62.0, 69.0, 76.0].map(|midi| midi_to_frequency(midi, reference_hz)))
    }

    pub fn open_strings(&self) -> &[f64; STRING_COUNT] {
        &self.0
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::violin(A4_HZ)
    }
}

impl TryFrom<[f64; STRING_COUNT]> for Tuning {
    type Error = ViolinError;

    fn try_from(value: [f64; STRING_COUNT]) -> Result<Self> {
        Tuning::new(value)
    }
}

impl From<Tuning> for [f64; STRING_COUNT] {
    fn from(tuning: Tuning) -> Self {
        tuning.0
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FingerPosition {
    pub string_index: usize,
    pub fret_index: usize,
}

impl FingerPosition {
    pub fn new(string_index: usize, fret_index: usize) -> Self {
        FingerPosition {
            string_index,
            fret_index,
        }
    }
}

/// Which entry of a note's position list to treat as canonical.
///
/// Positions are collected lowest string first, ascending fret within a
/// string, so `LastFound` favours the highest string that reaches the note.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    #[default]
    FirstFound,
    LastFound,
}

/// Every playable position on the fingerboard and the reverse index from
/// note to positions. Immutable once built.
#[derive(Clone, Debug)]
pub struct FingeringChart {
    reference_hz: f64,
    frets_per_string: usize,
    frequencies: Vec<Vec<f64>>,
    positions: BTreeMap<NoteName, Vec<FingerPosition>>,
}

impl FingeringChart {
    pub fn build(tuning: &Tuning, frets_per_string: usize) -> Self {
        Self::build_with_reference(tuning, frets_per_string, A4_HZ)
    }

    pub fn build_with_reference(tuning: &Tuning, frets_per_string: usize, reference_hz: f64) -> Self {
        let mut frequencies = Vec::with_capacity(STRING_COUNT);
        let mut positions: BTreeMap<NoteName, Vec<FingerPosition>> = BTreeMap::new();

        for (string_index, &open) in tuning.open_strings().iter().enumerate() {
            let frets: Vec<f64> = (0..=frets_per_string)
                .map(|fret| transpose(open, fret as f64))
                .collect();

            for (fret_index, &f) in frets.iter().enumerate() {
                let note = frequency_to_midi(f, reference_hz).and_then(midi_to_note_name);
                if let Some(note) = note {
                    positions
                        .entry(note)
                        .or_default()
                        .push(FingerPosition::new(string_index, fret_index));
                }
            }
            frequencies.push(frets);
        }

        FingeringChart {
            reference_hz,
            frets_per_string,
            frequencies,
            positions,
        }
    }

    pub fn reference_hz(&self) -> f64 {
        self.reference_hz
    }

    pub fn string_count(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frets_per_string(&self) -> usize {
        self.frets_per_string
    }

    pub fn frequency(&self, position: FingerPosition) -> Option<f64> {
        self.frequencies
            .get(position.string_index)?
            .get(position.fret_index)
            .copied()
    }

    pub fn midi(&self, position: FingerPosition) -> Option<f64> {
        frequency_to_midi(self.frequency(position)?, self.reference_hz)
    }

    pub fn note_name(&self, position: FingerPosition) -> Option<NoteName> {
        midi_to_note_name(self.midi(position)?)
    }

    pub fn note_positions(&self, note: &NoteName) -> &[FingerPosition] {
        self.positions.get(note).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_found(&self, note: &NoteName) -> Option<FingerPosition> {
        self.note_positions(note).first().copied()
    }

    pub fn last_found(&self, note: &NoteName) -> Option<FingerPosition> {
        self.note_positions(note).last().copied()
    }

    pub fn preferred(&self, note: &NoteName, preference: Preference) -> Option<FingerPosition> {
        match preference {
            Preference::FirstFound => self.first_found(note),
            Preference::LastFound => self.last_found(note),
        }
    }

    pub fn contains(&self, note: &NoteName) -> bool {
        !self.note_positions(note).is_empty()
    }

    pub fn notes(&self) -> impl Iterator<Item = &NoteName> {
        self.positions.keys()
    }

    /// String whose pitch at `fret_index` is closest to `pitch`; ties go to
    /// the lowest string. `None` when the fret is beyond the chart.
    pub fn closest_string_index(&self, pitch: f64, fret_index: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (string_index, frets) in self.frequencies.iter().enumerate() {
            let distance = (pitch - *frets.get(fret_index)?).abs();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((string_index, distance)),
            }
        }
        best.map(|(string_index, _)| string_index)
    }
}
