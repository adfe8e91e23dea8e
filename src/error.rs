use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViolinError>;

/// Per-tick paths never return these: a bad frequency yields `None`, an
/// unfingerable note yields no position, and a stale tracker tick is dropped.
#[derive(Debug, Error)]
pub enum ViolinError {
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("invalid config field '{field}': {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("invalid note name: {0:?}")]
    InvalidNoteName(String),

    #[error("song contains no notes")]
    EmptySong,

    #[error("string {string_index} fret {fret_index} is not on the fingering chart")]
    PositionOffChart { string_index: usize, fret_index: usize },

    #[error("unknown song preset: {0}")]
    UnknownPreset(String),

    #[error("song parse error: {0}")]
    SongParse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] serde_json::Error),
}
