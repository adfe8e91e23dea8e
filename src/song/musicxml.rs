use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, ViolinError};
use crate::pitch::math::{checked_midi, NoteName};
use crate::song::script::SongScript;

pub fn midi_from_pitch(step: char, alter: i32, octave: i32) -> Option<i32> {
    let base = match step {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    };
    checked_midi(octave, alter.checked_add(base)?)
}

/// Reads the melody of the first part of a MusicXML score.
///
/// Rests, chord tones after the first, and notes continuing a tie are
/// skipped: each remaining note is one attack the player has to make.
pub fn parse_song(xml: &str) -> Result<SongScript> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut notes: Vec<NoteName> = Vec::new();
    let mut title: Option<String> = None;

    let mut current_tag: Option<&'static str> = None;
    let mut part_count = 0u32;

    // Note state
    let mut in_note = false;
    let mut note_is_rest = false;
    let mut note_is_chord = false;
    let mut note_ties_back = false;
    let mut step: Option<char> = None;
    let mut alter: i32 = 0;
    let mut octave: Option<i32> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"part" => part_count += 1,
                b"note" => {
                    in_note = true;
                    note_is_rest = false;
                    note_is_chord = false;
                    note_ties_back = false;
                    step = None;
                    alter = 0;
                    octave = None;
                }
                b"rest" if in_note => note_is_rest = true,
                b"step" => current_tag = Some("step"),
                b"alter" => current_tag = Some("alter"),
                b"octave" => current_tag = Some("octave"),
                b"movement-title" => current_tag = Some("movement-title"),
                b"work-title" => current_tag = Some("work-title"),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"rest" if in_note => note_is_rest = true,
                    b"chord" if in_note => note_is_chord = true,
                    b"tie" if in_note => {
                        let stops = e
                            .attributes()
                            .flatten()
                            .any(|a| a.key.as_ref() == b"type" && a.value.as_ref() == b"stop");
                        if stops {
                            note_ties_back = true;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(tag) = current_tag.take() {
                    let text = e.unescape().map_err(|e| ViolinError::SongParse(e.to_string()))?;
                    match tag {
                        "step" => step = text.chars().next(),
                        "alter" => {
                            // MusicXML allows fractional alters; round to semitones
                            if let Ok(v) = text.parse::<f64>() {
                                alter = v.round() as i32;
                            }
                        }
                        "octave" => {
                            if let Ok(v) = text.parse::<i32>() {
                                octave = Some(v);
                            }
                        }
                        "movement-title" | "work-title" => {
                            if title.is_none() {
                                title = Some(text.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"note" if in_note => {
                    in_note = false;
                    let sounded = part_count <= 1 && !note_is_rest && !note_is_chord && !note_ties_back;
                    if sounded {
                        let s = step.ok_or_else(|| ViolinError::SongParse("missing pitch step".into()))?;
                        let o = octave.ok_or_else(|| ViolinError::SongParse("missing pitch octave".into()))?;
                        let midi = midi_from_pitch(s, alter, o).ok_or_else(|| {
                            ViolinError::SongParse(format!("pitch out of range: step {} alter {} octave {}", s, alter, o))
                        })?;
                        notes.push(NoteName::from_midi(midi));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ViolinError::SongParse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    let script = SongScript::new(notes)?;
    Ok(match title {
        Some(t) => script.with_title(t),
        None => script,
    })
}
