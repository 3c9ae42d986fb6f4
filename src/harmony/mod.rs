// Harmony Module
// Pitch names and the harmonic progression generators cycle through

pub mod pitch;
pub mod progression;

pub use pitch::{resolve, resolve_name, Pitch, PitchSpec};
pub use progression::{house_progression, ChordSpec, ChordStep, Progression};
