// Arrangement errors
// Every failure aborts the whole song build; nothing here is retryable

use thiserror::Error;

/// Errors that can occur while generating or exporting an arrangement
#[derive(Debug, Error)]
pub enum ArrangeError {
    #[error("Invalid pitch name: {0:?}")]
    InvalidPitchName(String),

    #[error("Invalid duration: {0} ticks (must be positive)")]
    InvalidDuration(u32),

    #[error("Invalid bar count: {0} (must be a positive integer)")]
    InvalidBarCount(f64),

    #[error("Unknown section name: {0:?}")]
    UnknownSectionName(String),

    #[error("Malformed root pitch: {0:?}")]
    MalformedRootPitch(String),

    #[error("Invalid stab density: {0}")]
    InvalidDensity(f64),

    #[error("Invalid tempo: {0} BPM")]
    InvalidTempo(f64),

    #[error("Harmonic progression has no chords")]
    EmptyProgression,

    #[error("Section writes to undeclared track {0:?}")]
    UnknownTrack(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write MIDI: {0}")]
    Midi(String),
}

pub type ArrangeResult<T> = Result<T, ArrangeError>;
