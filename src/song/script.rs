use serde::Serialize;

use crate::error::{Result, ViolinError};
use crate::fingering::chart::{FingerPosition, FingeringChart};
use crate::pitch::math::NoteName;

/// An ordered, non-empty list of target notes for follow-the-song mode.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SongScript {
    title: Option<String>,
    notes: Vec<NoteName>,
}

impl SongScript {
    pub fn new(notes: Vec<NoteName>) -> Result<Self> {
        if notes.is_empty() {
            return Err(ViolinError::EmptySong);
        }
        Ok(SongScript { title: None, notes })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parses whitespace or comma separated note names, e.g. "G3 A3 B3".
    pub fn parse(text: &str) -> Result<Self> {
        let notes = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<NoteName>>>()?;
        Self::new(notes)
    }

    pub fn from_positions(chart: &FingeringChart, positions: &[FingerPosition]) -> Result<Self> {
        let notes = positions
            .iter()
            .map(|&p| {
                chart.note_name(p).ok_or(ViolinError::PositionOffChart {
                    string_index: p.string_index,
                    fret_index: p.fret_index,
                })
            })
            .collect::<Result<Vec<NoteName>>>()?;
        Self::new(notes)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn notes(&self) -> &[NoteName] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NoteName> {
        self.notes.get(index)
    }

    pub fn unfingerable(&self, chart: &FingeringChart) -> Vec<NoteName> {
        let mut missing: Vec<NoteName> = Vec::new();
        for note in &self.notes {
            if !chart.contains(note) && !missing.contains(note) {
                missing.push(*note);
            }
        }
        missing
    }
}
