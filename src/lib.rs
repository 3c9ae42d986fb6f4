// Housebeat - Procedural house arrangement generator
// Module declarations

pub mod arranger;
pub mod config;
pub mod error;
pub mod groove;
pub mod harmony;
pub mod sink;

pub use arranger::{build_song, export_midi, write_midi_file, MidiExportOptions, Song};
pub use config::{SongConfig, StructureToken, TrackSpec};
pub use error::{ArrangeError, ArrangeResult};
pub use sink::{CollectingSink, NoteSink};
