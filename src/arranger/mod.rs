// Arranger - Pattern, section and song generation
// Builds timed phrases per track and exports them to MIDI

pub mod phrase;
pub mod drum_lanes;
pub mod melodic_lanes;
pub mod sections;
pub mod assembler;
pub mod song;
pub mod midi;

// Re-export main types
pub use phrase::{NoteEvent, Phrase, PhraseBuilder};
pub use drum_lanes::{DrumLayer, Fill, grid_layer, house_kick, house_clap, hat_offbeat, hat_closed_16, shaker_16, tom_fill_1bar, snare_roll};
pub use melodic_lanes::{BassStyle, piano_stabs, bass_groove, bass_groove_busy};
pub use sections::{SectionKind, SectionRecipe, SectionBlock, LayerEntry, FillPlacement};
pub use assembler::{build_song, plan_structure, PlannedSection};
pub use song::{Song, Track, TimedNote};
pub use midi::{MidiExportOptions, MidiSink, export_midi, write_midi_file};
