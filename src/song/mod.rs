pub mod matcher;
pub mod musicxml;
pub mod presets;
pub mod script;

pub use matcher::{Highlight, SongMatcher};
pub use script::SongScript;
