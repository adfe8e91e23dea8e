use log::{debug, warn};
use serde::Serialize;

use crate::config::ViolinConfig;
use crate::error::Result;
use crate::fingering::chart::{FingerPosition, FingeringChart, Preference};
use crate::intonation::engine::{Evaluation, IntonationEngine};
use crate::mode::{Button, Mode, ModeKind};
use crate::persistence::{self, KeyValueStore};
use crate::pitch::estimate::{PitchEstimate, PitchGate};
use crate::pitch::math::{frequency_to_midi, midi_to_note_name, NoteName};
use crate::song::matcher::Highlight;
use crate::song::presets;
use crate::song::script::SongScript;
use crate::tracker::pose::{Pose, Quat};
use crate::tracker::relative::RelativeTransformTracker;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct SongTarget {
    pub cursor: usize,
    pub note_name: NoteName,
    pub position: Option<FingerPosition>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Readout {
    pub mode: ModeKind,
    pub evaluation: Evaluation,
    pub position: Option<FingerPosition>,
    pub song: Option<SongTarget>,
    pub advanced: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ModeChange {
    pub mode: ModeKind,
    pub song: Option<SongTarget>,
}

pub struct Violin {
    config: ViolinConfig,
    gate: PitchGate,
    engine: IntonationEngine,
    song: SongScript,
    mode: Mode,
    tracker: RelativeTransformTracker,
    store: Box<dyn KeyValueStore>,
}

impl Violin {
    pub fn new(config: ViolinConfig, store: Box<dyn KeyValueStore>) -> Result<Self> {
        config.validate()?;
        let chart = FingeringChart::build_with_reference(&config.tuning(), config.frets_per_string, config.reference_hz);
        let song = match &config.song {
            Some(text) => SongScript::parse(text)?,
            None => presets::generate("open_strings", "", &chart)?,
        };
        let engine = IntonationEngine::new(chart, config.reference_hz, config.offset_tolerance);

        let violin = Violin {
            gate: config.pitch_gate(),
            tracker: RelativeTransformTracker::new(config.track_hand_frame),
            config,
            engine,
            song,
            mode: Mode::default(),
            store,
        };
        violin.warn_unfingerable();
        Ok(violin)
    }

    pub fn config(&self) -> &ViolinConfig {
        &self.config
    }

    pub fn engine(&self) -> &IntonationEngine {
        &self.engine
    }

    pub fn chart(&self) -> &FingeringChart {
        self.engine.chart()
    }

    pub fn song(&self) -> &SongScript {
        &self.song
    }

    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn tracker(&self) -> &RelativeTransformTracker {
        &self.tracker
    }

    fn preference(&self) -> Preference {
        self.config.preference
    }

    fn target(&self, highlight: Highlight) -> SongTarget {
        SongTarget {
            cursor: highlight.cursor,
            note_name: highlight.note_name,
            position: highlight.position(self.chart(), self.preference()),
        }
    }

    fn warn_unfingerable(&self) {
        for note in self.song.unfingerable(self.chart()) {
            warn!("song note {} has no fingering", note);
        }
    }

    /// Replaces the practice song. Restarts it when song mode is active.
    pub fn set_song(&mut self, song: SongScript) -> Option<SongTarget> {
        self.song = song;
        self.warn_unfingerable();
        if self.mode.kind() == ModeKind::Song {
            return self.enter(ModeKind::Song).song;
        }
        None
    }

    fn enter(&mut self, kind: ModeKind) -> ModeChange {
        if kind != ModeKind::Position {
            if let Err(e) = self.grab_end() {
                warn!("could not save pose on leaving position mode: {}", e);
            }
        }
        let (mode, highlight) = Mode::enter(kind, &self.song);
        self.mode = mode;
        ModeChange {
            mode: kind,
            song: highlight.map(|h| self.target(h)),
        }
    }

    pub fn press(&mut self, button: Button) -> ModeChange {
        let next = self.mode.kind().after(button);
        debug!("{:?} button: {:?} -> {:?}", button, self.mode.kind(), next);
        self.enter(next)
    }

    pub fn set_mode(&mut self, kind: ModeKind) -> ModeChange {
        self.enter(kind)
    }

    /// Moves the song cursor; always returns the target so the display
    /// refreshes. `None` outside song mode.
    pub fn jump_to(&mut self, index: usize) -> Option<SongTarget> {
        let highlight = match &mut self.mode {
            Mode::Song(matcher) => matcher.jump_to(index),
            _ => return None,
        };
        Some(self.target(highlight))
    }

    pub fn song_target(&self) -> Option<SongTarget> {
        match &self.mode {
            Mode::Song(matcher) => Some(self.target(matcher.current())),
            _ => None,
        }
    }

    /// Finger or peg currently lit: the last evaluated peg in tune mode, the
    /// last found position in fingers mode, the song target in song mode.
    pub fn highlight(&self) -> Option<FingerPosition> {
        match &self.mode {
            Mode::Position => None,
            Mode::Tune { string_index } => string_index.map(|s| FingerPosition::new(s, 0)),
            Mode::Fingers { position } => *position,
            Mode::Song(matcher) => matcher.current().position(self.chart(), self.preference()),
        }
    }

    /// Handles one reading from the pitch detector. `None` when the reading
    /// does not pass the gate, or in position mode.
    pub fn on_pitch(&mut self, estimate: &PitchEstimate) -> Option<Readout> {
        let pitch = self.gate.accept(estimate)?;
        let preference = self.preference();

        match &mut self.mode {
            Mode::Position => None,
            Mode::Tune { string_index } => {
                let evaluation = self.engine.evaluate_open_string(pitch)?;
                *string_index = Some(evaluation.string_index);
                Some(Readout {
                    mode: ModeKind::Tune,
                    position: Some(evaluation.position()),
                    evaluation,
                    song: None,
                    advanced: false,
                })
            }
            Mode::Fingers { position } => {
                let note = frequency_to_midi(pitch, self.engine.reference_hz()).and_then(midi_to_note_name)?;
                let found = self.engine.chart().preferred(&note, preference);
                let fret = found.map(|p| p.fret_index).unwrap_or(0);
                let evaluation = self.engine.evaluate(pitch, fret)?;
                *position = found;
                Some(Readout {
                    mode: ModeKind::Fingers,
                    evaluation,
                    position: found,
                    song: None,
                    advanced: false,
                })
            }
            Mode::Song(matcher) => {
                let current = matcher.current();
                let chart = self.engine.chart();
                let target_position = current.position(chart, preference);
                let fret = target_position.map(|p| p.fret_index).unwrap_or(0);
                let evaluation = self.engine.evaluate(pitch, fret)?;
                let next = matcher.observe(&evaluation.note_name);
                let advanced = next.is_some();
                let shown = next.unwrap_or(current);
                let song = SongTarget {
                    cursor: shown.cursor,
                    note_name: shown.note_name,
                    position: shown.position(chart, preference),
                };
                Some(Readout {
                    mode: ModeKind::Song,
                    evaluation,
                    position: song.position,
                    song: Some(song),
                    advanced,
                })
            }
        }
    }

    pub fn load_pose(&mut self) -> Pose {
        let pose = persistence::load_pose_or(self.store.as_ref(), self.config.default_pose());
        self.tracker.load_initial_pose(pose);
        pose
    }

    /// Grabs only move the instrument in position mode.
    pub fn grab_start(&mut self, controller: &Pose) -> bool {
        if self.mode.kind() != ModeKind::Position {
            return false;
        }
        self.tracker.grab_start(controller)
    }

    pub fn on_controller(&mut self, controller: &Pose, hand_orientation: Option<Quat>) -> Option<Pose> {
        self.tracker.tick(controller, hand_orientation)
    }

    pub fn grab_end(&mut self) -> Result<()> {
        if !self.tracker.is_grabbed() {
            return Ok(());
        }
        self.tracker.grab_end();
        persistence::save_pose(self.store.as_mut(), &self.tracker.pose())
    }

    pub fn pose(&self) -> Pose {
        self.tracker.pose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intonation::engine::Severity;
    use crate::persistence::MemoryStore;
    use crate::tracker::pose::Vec3;

    fn violin(config: ViolinConfig) -> Violin {
        Violin::new(config, Box::new(MemoryStore::new())).unwrap()
    }

    fn clear(hz: f64) -> PitchEstimate {
        PitchEstimate::new(hz, 0.99)
    }

    #[test]
    fn test_starts_in_position_mode() {
        let mut v = violin(ViolinConfig::default());
        assert_eq!(v.mode(), ModeKind::Position);
        assert!(v.on_pitch(&clear(440.0)).is_none());
    }

    #[test]
    fn test_tune_mode_highlights_peg() {
        let mut v = violin(ViolinConfig::default());
        v.press(Button::Top);
        assert_eq!(v.mode(), ModeKind::Tune);
        let readout = v.on_pitch(&clear(296.0)).unwrap();
        assert_eq!(readout.position, Some(FingerPosition::new(1, 0)));
        assert_eq!(readout.evaluation.severity, Severity::Sharp);
    }

    #[test]
    fn test_highlight_tracks_mode_state() {
        let mut v = violin(ViolinConfig::default());
        assert!(v.highlight().is_none());

        v.set_mode(ModeKind::Tune);
        assert!(v.highlight().is_none());
        v.on_pitch(&clear(296.0));
        assert_eq!(v.highlight(), Some(FingerPosition::new(1, 0)));
        // a filtered reading keeps the last peg lit
        v.on_pitch(&PitchEstimate::new(440.0, 0.1));
        assert_eq!(v.highlight(), Some(FingerPosition::new(1, 0)));

        v.set_mode(ModeKind::Fingers);
        assert!(v.highlight().is_none());
        let b4 = 440.0 * 2f64.powf(2.0 / 12.0);
        v.on_pitch(&clear(b4));
        assert_eq!(v.highlight(), Some(FingerPosition::new(1, 9)));

        v.set_mode(ModeKind::Song);
        assert_eq!(v.highlight(), Some(FingerPosition::new(0, 0)));
    }

    #[test]
    fn test_gate_blocks_unclear_pitch() {
        let mut v = violin(ViolinConfig::default());
        v.set_mode(ModeKind::Tune);
        assert!(v.on_pitch(&PitchEstimate::new(440.0, 0.2)).is_none());
    }

    #[test]
    fn test_fingers_mode_finds_position() {
        let mut v = violin(ViolinConfig::default());
        v.set_mode(ModeKind::Fingers);
        // B4: first found on the D string, 9th fret
        let b4 = 440.0 * 2f64.powf(2.0 / 12.0);
        let readout = v.on_pitch(&clear(b4)).unwrap();
        assert_eq!(readout.position, Some(FingerPosition::new(1, 9)));
        assert_eq!(readout.evaluation.note_name.to_string(), "B4");
        assert_eq!(readout.evaluation.severity, Severity::InTune);
    }

    #[test]
    fn test_song_mode_follows_script() {
        let config = ViolinConfig {
            song: Some("A4 B4 A4".to_string()),
            preference: Preference::LastFound,
            ..ViolinConfig::default()
        };
        let mut v = violin(config);
        let change = v.set_mode(ModeKind::Song);
        assert_eq!(change.song.unwrap().cursor, 0);
        assert_eq!(change.song.unwrap().position, Some(FingerPosition::new(2, 0)));

        let readout = v.on_pitch(&clear(440.0)).unwrap();
        assert!(readout.advanced);
        assert_eq!(readout.song.unwrap().cursor, 1);
        assert_eq!(readout.song.unwrap().position, Some(FingerPosition::new(2, 2)));

        let readout = v.on_pitch(&clear(440.0)).unwrap();
        assert!(!readout.advanced);
        assert_eq!(readout.song.unwrap().cursor, 1);
    }

    #[test]
    fn test_unfingerable_song_note_has_no_position() {
        let config = ViolinConfig {
            song: Some("C2 A4".to_string()),
            ..ViolinConfig::default()
        };
        let mut v = violin(config);
        let change = v.set_mode(ModeKind::Song);
        let target = change.song.unwrap();
        assert_eq!(target.note_name.to_string(), "C2");
        assert!(target.position.is_none());
        assert!(v.on_pitch(&clear(440.0)).is_some());
    }

    #[test]
    fn test_jump_to_reemits() {
        let mut v = violin(ViolinConfig::default());
        assert!(v.jump_to(1).is_none());
        v.set_mode(ModeKind::Song);
        assert_eq!(v.jump_to(2).unwrap().note_name.to_string(), "A4");
        assert_eq!(v.jump_to(2).unwrap().cursor, 2);
        assert_eq!(v.song_target().unwrap().cursor, 2);
    }

    #[test]
    fn test_grab_only_in_position_mode() {
        let mut v = violin(ViolinConfig::default());
        v.load_pose();
        v.set_mode(ModeKind::Tune);
        assert!(!v.grab_start(&Pose::default()));
        v.set_mode(ModeKind::Position);
        assert!(v.grab_start(&Pose::default()));
    }

    #[test]
    fn test_grab_end_persists_pose() {
        let mut v = violin(ViolinConfig::default());
        let start = v.load_pose();
        v.grab_start(&Pose::default());
        let moved = v
            .on_controller(&Pose::new(Vec3::new(0.1, 0.0, 0.0), Quat::IDENTITY), None)
            .unwrap();
        assert!((moved.position - (start.position + Vec3::new(0.1, 0.0, 0.0))).length() < 1e-9);
        v.grab_end().unwrap();

        let stored = persistence::load_pose(v.store.as_ref()).unwrap().unwrap();
        assert!(stored.approx_eq(&moved, 1e-12));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ViolinConfig {
            song: Some("not a note".to_string()),
            ..ViolinConfig::default()
        };
        assert!(Violin::new(config, Box::new(MemoryStore::new())).is_err());
    }
}
