// Song configuration
// Title, tempo, structure, tracks and progression; JSON-loadable with house defaults

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::path::Path;

use crate::arranger::sections::{BASS_TRACK, DEFAULT_SECTION_BARS, DRUMS_TRACK, PIANO_TRACK};
use crate::error::{ArrangeError, ArrangeResult};
use crate::harmony::{house_progression, ChordSpec};

/// General MIDI programs (0-indexed) used by the default tracks
pub const ELECTRIC_PIANO: u8 = 4;
pub const FINGERED_BASS: u8 = 33;

/// MIDI channel reserved for percussion (channel 10, 0-indexed)
pub const PERCUSSION_CHANNEL: u8 = 9;

/// One entry of the song structure: a section name, optionally with a bar count
///
/// Written as `"verse"` or `["verse", 8]`. The count is kept as written and
/// checked when the structure is planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructureToken {
    Sized(String, Number),
    Named(String),
}

impl StructureToken {
    pub fn named(name: &str) -> Self {
        StructureToken::Named(name.to_string())
    }

    pub fn sized(name: &str, bars: i64) -> Self {
        StructureToken::Sized(name.to_string(), Number::from(bars))
    }

    pub fn name(&self) -> &str {
        match self {
            StructureToken::Sized(name, _) | StructureToken::Named(name) => name,
        }
    }

    /// Requested bar count, or `default_bars` when the token gives none
    ///
    /// Fails with `InvalidBarCount` when the count is not a whole number.
    /// Sign and range are left to the planner.
    pub fn bars_or(&self, default_bars: u32) -> ArrangeResult<i64> {
        match self {
            StructureToken::Sized(_, bars) => whole_bars(bars),
            StructureToken::Named(_) => Ok(i64::from(default_bars)),
        }
    }
}

fn whole_bars(bars: &Number) -> ArrangeResult<i64> {
    if let Some(n) = bars.as_i64() {
        return Ok(n);
    }
    // Floats like 8.0 count; 2.5 and out-of-range integers don't
    let value = bars.as_f64().unwrap_or(f64::NAN);
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(value as i64)
    } else {
        Err(ArrangeError::InvalidBarCount(value))
    }
}

/// A track declaration: name, GM program and MIDI channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub name: String,
    pub program: u8,
    pub channel: u8,
}

impl TrackSpec {
    pub fn new(name: &str, program: u8, channel: u8) -> Self {
        TrackSpec {
            name: name.to_string(),
            program,
            channel,
        }
    }
}

/// Everything needed to build one song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongConfig {
    pub title: String,

    /// Tempo in beats per minute
    pub tempo_bpm: f64,

    /// Bar count for structure tokens without one
    pub default_bars: u32,

    pub structure: Vec<StructureToken>,

    pub tracks: Vec<TrackSpec>,

    pub progression: Vec<ChordSpec>,
}

impl Default for SongConfig {
    fn default() -> Self {
        SongConfig {
            title: "House".to_string(),
            tempo_bpm: 124.0,
            default_bars: DEFAULT_SECTION_BARS,
            structure: vec![
                StructureToken::sized("intro", 8),
                StructureToken::sized("verse", 8),
                StructureToken::sized("pre", 4),
                StructureToken::sized("chorus", 8),
                StructureToken::sized("verse", 8),
                StructureToken::sized("pre", 4),
                StructureToken::sized("chorus", 8),
                StructureToken::sized("bridge", 4),
                StructureToken::sized("chorus", 8),
                StructureToken::sized("outro", 8),
            ],
            tracks: default_tracks(),
            progression: house_progression(),
        }
    }
}

/// Piano, bass and drums on channels 0, 1 and 9
pub fn default_tracks() -> Vec<TrackSpec> {
    vec![
        TrackSpec::new(PIANO_TRACK, ELECTRIC_PIANO, 0),
        TrackSpec::new(BASS_TRACK, FINGERED_BASS, 1),
        TrackSpec::new(DRUMS_TRACK, 0, PERCUSSION_CHANNEL),
    ]
}

impl SongConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ArrangeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> ArrangeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ArrangeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total bars the structure asks for, counting defaults
    pub fn requested_bars(&self) -> ArrangeResult<i64> {
        self.structure
            .iter()
            .map(|t| t.bars_or(self.default_bars))
            .sum()
    }
}
