use std::fmt::Display;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod config;
pub mod error;
pub mod fingering;
pub mod intonation;
pub mod mode;
pub mod persistence;
pub mod pitch;
pub mod song;
pub mod throttle;
pub mod tracker;
pub mod violin;

use config::ViolinConfig;
use error::ViolinError;
use mode::Button;
use persistence::{KeyValueStore, MemoryStore};
use pitch::estimate::PitchEstimate;
use pitch::trail::PitchTrail;
use song::script::SongScript;
use throttle::Throttle;
use tracker::pose::{Pose, Quat, Vec3};
use violin::Violin;

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_err)
}

fn pose_from_slices(position: &[f64], orientation: &[f64]) -> Result<Pose, JsValue> {
    match (position, orientation) {
        ([x, y, z], [qx, qy, qz, qw]) => Ok(Pose::new(Vec3::new(*x, *y, *z), Quat::new(*qx, *qy, *qz, *qw))),
        _ => Err(JsValue::from_str("pose needs 3 position and 4 orientation components")),
    }
}

/// Adapter for a `localStorage`-shaped JS object (`getItem` / `setItem`).
struct JsStore {
    storage: JsValue,
}

impl JsStore {
    fn method(&self, name: &str) -> Result<Function, JsValue> {
        Reflect::get(&self.storage, &JsValue::from_str(name))?.dyn_into::<Function>()
    }
}

impl KeyValueStore for JsStore {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        let get_item = self.method("getItem").ok()?;
        let value = get_item.call1(&self.storage, &JsValue::from_str(key)).ok()?;
        value.as_string().map(String::into_bytes)
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> error::Result<()> {
        let text = std::str::from_utf8(bytes).map_err(|e| ViolinError::Store(e.to_string()))?;
        let set_item = self
            .method("setItem")
            .map_err(|e| ViolinError::Store(format!("{:?}", e)))?;
        set_item
            .call2(&self.storage, &JsValue::from_str(key), &JsValue::from_str(text))
            .map_err(|e| ViolinError::Store(format!("{:?}", e)))?;
        Ok(())
    }
}

#[wasm_bindgen]
pub fn frequency_to_note(hz: f64, reference_hz: f64) -> Option<String> {
    let midi = pitch::math::frequency_to_midi(hz, reference_hz)?;
    pitch::math::midi_to_note_name(midi).map(|n| n.to_string())
}

/// Offset from the nearest note as a fraction of a semitone in [-0.5, 0.5).
#[wasm_bindgen]
pub fn frequency_offset(hz: f64, reference_hz: f64) -> Option<f64> {
    pitch::math::cents_offset(hz, reference_hz)
}

#[wasm_bindgen]
pub struct WasmViolin {
    inner: Violin,
    pitch_throttle: Throttle,
    trail: PitchTrail,
    recording_since_ms: Option<f64>,
}

#[wasm_bindgen]
impl WasmViolin {
    /// `config` is a partial `ViolinConfig` object (or undefined); `storage`
    /// is `window.localStorage` or undefined for an in-memory store.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, storage: JsValue) -> Result<WasmViolin, JsValue> {
        let config: ViolinConfig = if config.is_null() || config.is_undefined() {
            ViolinConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(js_err)?
        };
        let store: Box<dyn KeyValueStore> = if storage.is_null() || storage.is_undefined() {
            Box::new(MemoryStore::new())
        } else {
            Box::new(JsStore { storage })
        };
        let pitch_throttle = Throttle::new(config.pitch_interval_ms);
        let inner = Violin::new(config, store).map_err(js_err)?;
        Ok(WasmViolin {
            inner,
            pitch_throttle,
            trail: PitchTrail::new(),
            recording_since_ms: None,
        })
    }

    pub fn load_pose(&mut self) -> Result<JsValue, JsValue> {
        let pose = self.inner.load_pose();
        to_js(&pose)
    }

    pub fn pose(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.pose())
    }

    pub fn mode(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.mode())
    }

    /// Feeds one detector reading. Returns null when throttled or filtered.
    pub fn pitch_tick(&mut self, now_ms: f64, hz: f64, clarity: f64) -> Result<JsValue, JsValue> {
        if !self.pitch_throttle.ready(now_ms) {
            return Ok(JsValue::NULL);
        }
        match self.inner.on_pitch(&PitchEstimate::new(hz, clarity)) {
            Some(readout) => {
                if let Some(start) = self.recording_since_ms {
                    self.trail.push_pitch((now_ms - start) / 1000.0, readout.evaluation.pitch_hz);
                }
                to_js(&readout)
            }
            None => Ok(JsValue::NULL),
        }
    }

    pub fn grab_start(&mut self, position: &[f64], orientation: &[f64]) -> Result<bool, JsValue> {
        let controller = pose_from_slices(position, orientation)?;
        Ok(self.inner.grab_start(&controller))
    }

    pub fn controller_tick(
        &mut self,
        position: &[f64],
        orientation: &[f64],
        hand_orientation: Option<Vec<f64>>,
    ) -> Result<JsValue, JsValue> {
        let controller = pose_from_slices(position, orientation)?;
        let hand = match hand_orientation.as_deref() {
            Some([x, y, z, w]) => Some(Quat::new(*x, *y, *z, *w)),
            Some(_) => return Err(JsValue::from_str("hand orientation needs 4 components")),
            None => None,
        };
        match self.inner.on_controller(&controller, hand) {
            Some(pose) => to_js(&pose),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn grab_end(&mut self) -> Result<(), JsValue> {
        self.inner.grab_end().map_err(js_err)
    }

    /// `{ string_index, fret_index }` currently lit, or null.
    pub fn highlight(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.highlight())
    }

    pub fn top_button(&mut self) -> Result<JsValue, JsValue> {
        let change = self.inner.press(Button::Top);
        to_js(&change)
    }

    pub fn bottom_button(&mut self) -> Result<JsValue, JsValue> {
        let change = self.inner.press(Button::Bottom);
        to_js(&change)
    }

    pub fn button_names(&self) -> Array {
        let (top, bottom) = self.inner.config().side.bow_hand_buttons();
        Array::of2(&JsValue::from_str(top), &JsValue::from_str(bottom))
    }

    pub fn jump_to(&mut self, index: usize) -> Result<JsValue, JsValue> {
        to_js(&self.inner.jump_to(index))
    }

    pub fn load_song_text(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let script = SongScript::parse(text).map_err(js_err)?;
        to_js(&self.inner.set_song(script))
    }

    pub fn load_song_musicxml(&mut self, xml: &str) -> Result<JsValue, JsValue> {
        let script = song::musicxml::parse_song(xml).map_err(js_err)?;
        to_js(&self.inner.set_song(script))
    }

    pub fn load_song_preset(&mut self, preset: &str, key: &str) -> Result<JsValue, JsValue> {
        let script = song::presets::generate(preset, key, self.inner.chart()).map_err(js_err)?;
        to_js(&self.inner.set_song(script))
    }

    pub fn song(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.song())
    }

    pub fn note_positions(&self, note: &str) -> Result<JsValue, JsValue> {
        let note: pitch::math::NoteName = note.parse().map_err(js_err)?;
        to_js(&self.inner.chart().note_positions(&note))
    }

    pub fn start_recording(&mut self, now_ms: f64) {
        self.trail.clear();
        self.recording_since_ms = Some(now_ms);
    }

    pub fn stop_recording(&mut self) {
        self.recording_since_ms = None;
    }

    pub fn is_recording(&self) -> bool {
        self.recording_since_ms.is_some()
    }

    pub fn record_volume(&mut self, now_ms: f64, volume: f64) {
        if let Some(start) = self.recording_since_ms {
            self.trail.push_volume((now_ms - start) / 1000.0, volume);
        }
    }

    pub fn recorded_pitch_at(&self, seconds: f64) -> f64 {
        self.trail.pitch_at(seconds)
    }

    pub fn recorded_volume_at(&self, seconds: f64) -> f64 {
        self.trail.volume_at(seconds)
    }

    pub fn recording(&self) -> Result<JsValue, JsValue> {
        to_js(&self.trail)
    }
}
