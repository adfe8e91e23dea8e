use crate::error::{Result, ViolinError};
use crate::fingering::chart::{FingerPosition, FingeringChart, STRING_COUNT};
use crate::pitch::math::NoteName;
use crate::song::script::SongScript;

const MAJOR_SCALE: [i32; 8] = [0, 2, 4, 5, 7, 9, 11, 12];
const MAJOR_ARPEGGIO: [i32; 4] = [0, 4, 7, 12];

pub fn generate(preset: &str, key: &str, chart: &FingeringChart) -> Result<SongScript> {
    match preset {
        "open_strings" => open_strings(chart),
        "major_scale" => up_and_down(key.parse()?, &MAJOR_SCALE, "Major Scale"),
        "arpeggio" => up_and_down(key.parse()?, &MAJOR_ARPEGGIO, "Arpeggio"),
        "chromatic" => {
            let steps: Vec<i32> = (0..=12).collect();
            up_and_down(key.parse()?, &steps, "Chromatic")
        }
        _ => Err(ViolinError::UnknownPreset(preset.to_string())),
    }
}

fn open_strings(chart: &FingeringChart) -> Result<SongScript> {
    let positions: Vec<FingerPosition> = (0..STRING_COUNT).map(|s| FingerPosition::new(s, 0)).collect();
    Ok(SongScript::from_positions(chart, &positions)?.with_title("Open Strings"))
}

/// Ascends through `steps` from `root`, then descends without repeating the top.
fn up_and_down(root: NoteName, steps: &[i32], title: &str) -> Result<SongScript> {
    let base = root.midi();
    let notes = steps
        .iter()
        .chain(steps.iter().rev().skip(1))
        .map(|s| base.checked_add(*s).map(NoteName::from_midi))
        .collect::<Option<Vec<NoteName>>>()
        .ok_or_else(|| ViolinError::InvalidNoteName(root.to_string()))?;
    Ok(SongScript::new(notes)?.with_title(format!("{} in {}", title, root)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingering::chart::Tuning;

    fn chart() -> FingeringChart {
        FingeringChart::build(&Tuning::default(), 12)
    }

    fn names(script: &SongScript) -> Vec<String> {
        script.notes().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_open_strings() {
        let script = generate("open_strings", "", &chart()).unwrap();
        assert_eq!(names(&script), vec!["G3", "D4", "A4", "E5"]);
        assert_eq!(script.title(), Some("Open Strings"));
    }

    #[test]
    fn test_major_scale_in_d() {
        let script = generate("major_scale", "D4", &chart()).unwrap();
        assert_eq!(script.len(), 15);
        assert_eq!(
            names(&script)[..8],
            ["D4", "E4", "F#4", "G4", "A4", "B4", "C#5", "D5"]
        );
        assert_eq!(names(&script).last().unwrap(), "D4");
    }

    #[test]
    fn test_presets_are_fingerable() {
        let chart = chart();
        for preset in ["open_strings", "major_scale", "arpeggio", "chromatic"] {
            let script = generate(preset, "G3", &chart).unwrap();
            assert!(script.unfingerable(&chart).is_empty(), "{}", preset);
        }
    }

    #[test]
    fn test_unknown_preset_and_bad_key() {
        assert!(matches!(generate("polka", "C4", &chart()), Err(ViolinError::UnknownPreset(_))));
        assert!(matches!(generate("major_scale", "Z4", &chart()), Err(ViolinError::InvalidNoteName(_))));
    }

    #[test]
    fn test_key_at_top_of_range() {
        // the root fits but the octave above it does not
        assert!(matches!(
            generate("major_scale", "G178956969", &chart()),
            Err(ViolinError::InvalidNoteName(_))
        ));
    }
}
