pub mod estimate;
pub mod math;
pub mod trail;

pub use estimate::{PitchEstimate, PitchGate};
pub use math::{cents_offset, frequency_to_midi, midi_to_frequency, midi_to_note_name, NoteName, A4_HZ};
