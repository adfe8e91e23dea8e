use log::debug;
use serde::Serialize;

use crate::fingering::chart::{FingerPosition, FingeringChart, Preference};
use crate::pitch::math::NoteName;
use crate::song::script::SongScript;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    pub cursor: usize,
    pub note_name: NoteName,
}

impl Highlight {
    pub fn position(&self, chart: &FingeringChart, preference: Preference) -> Option<FingerPosition> {
        chart.preferred(&self.note_name, preference)
    }
}

/// Cursor over a cyclic song script.
///
/// The cursor wraps to the start after the last note; there is no finished
/// state.
#[derive(Clone, Debug)]
pub struct SongMatcher {
    script: SongScript,
    cursor: usize,
}

impl SongMatcher {
    pub fn new(script: SongScript) -> Self {
        SongMatcher { script, cursor: 0 }
    }

    pub fn script(&self) -> &SongScript {
        &self.script
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Highlight {
        Highlight {
            cursor: self.cursor,
            note_name: self.script.notes()[self.cursor],
        }
    }

    pub fn observe(&mut self, detected: &NoteName) -> Option<Highlight> {
        if *detected != self.script.notes()[self.cursor] {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.script.len();
        debug!("song advanced to {} ({})", self.cursor, self.script.notes()[self.cursor]);
        Some(self.current())
    }

    /// Moves the cursor, wrapping out-of-range indices, and always returns
    /// the highlight so the display refreshes.
    pub fn jump_to(&mut self, index: usize) -> Highlight {
        self.cursor = index % self.script.len();
        self.current()
    }

    pub fn reset(&mut self) -> Highlight {
        self.jump_to(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingering::chart::Tuning;

    fn note(name: &str) -> NoteName {
        name.parse().unwrap()
    }

    #[test]
    fn test_advances_and_wraps() {
        let script = SongScript::parse("A4 B4 A4").unwrap();
        let mut matcher = SongMatcher::new(script);
        let mut cursors = vec![matcher.cursor()];
        for detected in ["A4", "B4", "A4", "A4"] {
            matcher.observe(&note(detected));
            cursors.push(matcher.cursor());
        }
        assert_eq!(cursors, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_wrong_note_stays() {
        let mut matcher = SongMatcher::new(SongScript::parse("A4 B4").unwrap());
        assert!(matcher.observe(&note("C5")).is_none());
        // same pitch class in another octave is a different note
        assert!(matcher.observe(&note("A3")).is_none());
        assert_eq!(matcher.cursor(), 0);
    }

    #[test]
    fn test_observe_returns_next_target() {
        let mut matcher = SongMatcher::new(SongScript::parse("A4 B4").unwrap());
        let next = matcher.observe(&note("A4")).unwrap();
        assert_eq!(next.cursor, 1);
        assert_eq!(next.note_name, note("B4"));
    }

    #[test]
    fn test_jump_and_reset_always_emit() {
        let mut matcher = SongMatcher::new(SongScript::parse("G3 A3 B3").unwrap());
        let h = matcher.reset();
        assert_eq!(h.cursor, 0);
        let h = matcher.jump_to(2);
        assert_eq!(h.note_name, note("B3"));
        let h = matcher.jump_to(2);
        assert_eq!(h.cursor, 2);
        assert_eq!(matcher.jump_to(4).cursor, 1);
    }

    #[test]
    fn test_highlight_position() {
        let chart = FingeringChart::build(&Tuning::default(), 7);
        let matcher = SongMatcher::new(SongScript::parse("A4 C2").unwrap());
        let h = matcher.current();
        assert_eq!(h.position(&chart, Preference::FirstFound), Some(FingerPosition::new(1, 7)));
        assert_eq!(h.position(&chart, Preference::LastFound), Some(FingerPosition::new(2, 0)));

        let missing = Highlight { cursor: 1, note_name: note("C2") };
        assert!(missing.position(&chart, Preference::FirstFound).is_none());
    }
}
