use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViolinError;

pub const A4_HZ: f64 = 440.0;
pub const A4_MIDI: f64 = 69.0;

const SEMITONES: i32 = 12;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Rounds half-way values toward positive infinity so that offsets stay in
/// `[-0.5, 0.5)` for negative inputs too.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// MIDI number of `semitone` steps above C in `octave`, or `None` when it
/// does not fit an `i32`.
pub fn checked_midi(octave: i32, semitone: i32) -> Option<i32> {
    octave.checked_add(1)?.checked_mul(SEMITONES)?.checked_add(semitone)
}

fn is_valid_frequency(frequency: f64) -> bool {
    frequency.is_finite() && frequency > 0.0
}

/// Fractional MIDI number of `frequency` relative to a reference pitch.
/// Returns `None` for zero, negative or non-finite input.
pub fn frequency_to_midi_from(frequency: f64, reference_hz: f64, reference_midi: f64) -> Option<f64> {
    if !is_valid_frequency(frequency) || !is_valid_frequency(reference_hz) {
        return None;
    }
    Some(reference_midi + 12.0 * (frequency / reference_hz).log2())
}

pub fn frequency_to_midi(frequency: f64, reference_hz: f64) -> Option<f64> {
    frequency_to_midi_from(frequency, reference_hz, A4_MIDI)
}

pub fn midi_to_frequency(midi: f64, reference_hz: f64) -> f64 {
    reference_hz * 2f64.powf((midi - A4_MIDI) / 12.0)
}

pub fn transpose(frequency: f64, semitones: f64) -> f64 {
    frequency * 2f64.powf(semitones / 12.0)
}

pub fn midi_to_note_name(midi: f64) -> Option<NoteName> {
    if !midi.is_finite() {
        return None;
    }
    Some(NoteName::from_midi(round_half_up(midi) as i32))
}

/// Offset of `frequency` from the nearest equal-tempered note, as a fraction
/// of a semitone in `[-0.5, 0.5)`.
///
/// This is not cents: the display layer multiplies it by 100 and shows a
/// percentage of a semitone.
pub fn cents_offset(frequency: f64, reference_hz: f64) -> Option<f64> {
    if !is_valid_frequency(frequency) || !is_valid_frequency(reference_hz) {
        return None;
    }
    let semitones = 12.0 * (frequency / reference_hz).log2();
    Some(semitones - round_half_up(semitones))
}

/// A pitch class (0 = C .. 11 = B) together with a scientific-notation octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteName {
    octave: i32,
    pitch_class: u8,
}

impl NoteName {
    pub fn from_midi(midi: i32) -> Self {
        NoteName {
            octave: midi.div_euclid(SEMITONES) - 1,
            pitch_class: midi.rem_euclid(SEMITONES) as u8,
        }
    }

    pub fn pitch_class(&self) -> u8 {
        self.pitch_class
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn midi(&self) -> i32 {
        (self.octave + 1) * SEMITONES + self.pitch_class as i32
    }

    pub fn label(&self) -> &'static str {
        NOTE_NAMES[self.pitch_class as usize]
    }

    pub fn frequency(&self, reference_hz: f64) -> f64 {
        midi_to_frequency(self.midi() as f64, reference_hz)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label(), self.octave)
    }
}

impl FromStr for NoteName {
    type Err = ViolinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ViolinError::InvalidNoteName(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let base = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(invalid()),
        };
        let rest = chars.as_str();
        let (alter, octave_str) = if let Some(r) = rest.strip_prefix('#') {
            (1, r)
        } else if let Some(r) = rest.strip_prefix('b') {
            (-1, r)
        } else {
            (0, rest)
        };
        let octave: i32 = octave_str.parse().map_err(|_| invalid())?;
        let midi = checked_midi(octave, base + alter).ok_or_else(invalid)?;
        Ok(NoteName::from_midi(midi))
    }
}

impl TryFrom<String> for NoteName {
    type Error = ViolinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteName> for String {
    fn from(note: NoteName) -> Self {
        note.to_string()
    }
}
