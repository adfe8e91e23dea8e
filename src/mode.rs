use log::debug;
use serde::{Deserialize, Serialize};

use crate::fingering::chart::FingerPosition;
use crate::song::matcher::{Highlight, SongMatcher};
use crate::song::script::SongScript;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Position,
    Tune,
    Fingers,
    Song,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    Top,
    Bottom,
}

const TRANSITIONS: [(ModeKind, Button, ModeKind); 8] = [
    (ModeKind::Position, Button::Top, ModeKind::Tune),
    (ModeKind::Tune, Button::Top, ModeKind::Fingers),
    (ModeKind::Fingers, Button::Top, ModeKind::Song),
    (ModeKind::Song, Button::Top, ModeKind::Position),
    (ModeKind::Position, Button::Bottom, ModeKind::Song),
    (ModeKind::Tune, Button::Bottom, ModeKind::Position),
    (ModeKind::Fingers, Button::Bottom, ModeKind::Tune),
    (ModeKind::Song, Button::Bottom, ModeKind::Fingers),
];

impl ModeKind {
    pub fn after(self, button: Button) -> ModeKind {
        TRANSITIONS
            .iter()
            .find(|(from, b, _)| *from == self && *b == button)
            .map(|(_, _, to)| *to)
            .unwrap_or(self)
    }
}

/// The active interaction mode and the state only that mode needs.
#[derive(Clone, Debug, Default)]
pub enum Mode {
    #[default]
    Position,
    Tune {
        string_index: Option<usize>,
    },
    Fingers {
        position: Option<FingerPosition>,
    },
    Song(SongMatcher),
}

impl Mode {
    /// Fresh state for `kind`. Entering song mode restarts the script and
    /// returns the first highlight.
    pub fn enter(kind: ModeKind, script: &SongScript) -> (Mode, Option<Highlight>) {
        debug!("entering {:?} mode", kind);
        match kind {
            ModeKind::Position => (Mode::Position, None),
            ModeKind::Tune => (Mode::Tune { string_index: None }, None),
            ModeKind::Fingers => (Mode::Fingers { position: None }, None),
            ModeKind::Song => {
                let mut matcher = SongMatcher::new(script.clone());
                let highlight = matcher.reset();
                (Mode::Song(matcher), Some(highlight))
            }
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Position => ModeKind::Position,
            Mode::Tune { .. } => ModeKind::Tune,
            Mode::Fingers { .. } => ModeKind::Fingers,
            Mode::Song(_) => ModeKind::Song,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ModeKind; 4] = [ModeKind::Position, ModeKind::Tune, ModeKind::Fingers, ModeKind::Song];

    #[test]
    fn test_top_cycles_forward() {
        let mut kind = ModeKind::Position;
        let mut seen = vec![kind];
        for _ in 0..4 {
            kind = kind.after(Button::Top);
            seen.push(kind);
        }
        assert_eq!(
            seen,
            vec![ModeKind::Position, ModeKind::Tune, ModeKind::Fingers, ModeKind::Song, ModeKind::Position]
        );
    }

    #[test]
    fn test_bottom_undoes_top() {
        for kind in ALL {
            assert_eq!(kind.after(Button::Top).after(Button::Bottom), kind);
        }
    }

    #[test]
    fn test_enter_song_highlights_first_note() {
        let script = SongScript::parse("D4 E4").unwrap();
        let (mode, highlight) = Mode::enter(ModeKind::Song, &script);
        assert_eq!(mode.kind(), ModeKind::Song);
        let highlight = highlight.unwrap();
        assert_eq!(highlight.cursor, 0);
        assert_eq!(highlight.note_name.to_string(), "D4");
    }

    #[test]
    fn test_enter_other_modes_is_quiet() {
        let script = SongScript::parse("D4").unwrap();
        for kind in [ModeKind::Position, ModeKind::Tune, ModeKind::Fingers] {
            let (mode, highlight) = Mode::enter(kind, &script);
            assert_eq!(mode.kind(), kind);
            assert!(highlight.is_none());
        }
    }
}
