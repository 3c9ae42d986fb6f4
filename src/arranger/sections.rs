// Section Generators - One recipe per song-section type
// Combines drum and melodic lanes into one flattened phrase per track

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::drum_lanes::{check_bars, DrumLayer, Fill};
use super::melodic_lanes::{piano_stabs, BassStyle};
use super::phrase::{Phrase, PhraseBuilder};
use crate::error::{ArrangeError, ArrangeResult};
use crate::groove::{MusicalTime, QUARTER, WHOLE};
use crate::harmony::Progression;

/// Track names every section writes to
pub const PIANO_TRACK: &str = "PIANO";
pub const BASS_TRACK: &str = "BASS";
pub const DRUMS_TRACK: &str = "DRUMS";

/// Bar count used when a structure token gives none
pub const DEFAULT_SECTION_BARS: u32 = 4;

/// Song section types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Hats and sparse stabs; a half-length kick arrives halfway through
    Intro,

    /// Full groove at medium stab density
    Verse,

    /// Build without kick, tom run into the next section
    Pre,

    /// Everything on, busier bass
    Chorus,

    /// Breakdown: no kick or bass, snare roll from beat 2 of the last bar
    Bridge,

    /// Kick, hats and the plain groove
    Outro,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Intro,
        SectionKind::Verse,
        SectionKind::Pre,
        SectionKind::Chorus,
        SectionKind::Bridge,
        SectionKind::Outro,
    ];

    /// Name as written in song structures
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Verse => "verse",
            SectionKind::Pre => "pre",
            SectionKind::Chorus => "chorus",
            SectionKind::Bridge => "bridge",
            SectionKind::Outro => "outro",
        }
    }

    /// Get the recipe for this section
    pub fn recipe(&self) -> SectionRecipe {
        use DrumLayer::*;

        match self {
            SectionKind::Intro => SectionRecipe {
                piano_density: 0.5,
                bass: BassStyle::Silent,
                drums: vec![
                    LayerEntry::full(ClosedHat),
                    LayerEntry::full(OffbeatHat),
                    LayerEntry::from_midpoint(Kick),
                ],
                fill: None,
            },

            SectionKind::Verse => SectionRecipe {
                piano_density: 0.75,
                bass: BassStyle::Groove,
                drums: vec![
                    LayerEntry::full(Kick),
                    LayerEntry::full(Clap),
                    LayerEntry::full(OffbeatHat),
                    LayerEntry::full(Shaker),
                ],
                fill: None,
            },

            SectionKind::Pre => SectionRecipe {
                piano_density: 1.0,
                bass: BassStyle::Groove,
                drums: vec![
                    LayerEntry::full(Clap),
                    LayerEntry::full(OffbeatHat),
                    LayerEntry::full(ClosedHat),
                ],
                fill: Some(FillPlacement::LastBar(Fill::TomRun)),
            },

            SectionKind::Chorus => SectionRecipe {
                piano_density: 1.0,
                bass: BassStyle::Busy,
                drums: vec![
                    LayerEntry::full(Kick),
                    LayerEntry::full(Clap),
                    LayerEntry::full(OffbeatHat),
                    LayerEntry::full(Shaker),
                    LayerEntry::full(ClosedHat),
                ],
                fill: None,
            },

            SectionKind::Bridge => SectionRecipe {
                piano_density: 0.5,
                bass: BassStyle::Silent,
                drums: vec![LayerEntry::full(Clap), LayerEntry::full(ClosedHat)],
                fill: Some(FillPlacement::LastBarFrom(Fill::SnareRoll, QUARTER)),
            },

            SectionKind::Outro => SectionRecipe {
                piano_density: 0.5,
                bass: BassStyle::Groove,
                drums: vec![LayerEntry::full(Kick), LayerEntry::full(OffbeatHat)],
                fill: None,
            },
        }
    }

    /// Generate this section for `bars` bars
    pub fn generate(&self, bars: u32, progression: &Progression) -> ArrangeResult<SectionBlock> {
        self.recipe().generate(*self, bars, progression)
    }
}

impl FromStr for SectionKind {
    type Err = ArrangeError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| ArrangeError::UnknownSectionName(s.to_string()))
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a drum layer starts inside its section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerEntry {
    /// Plays the whole section
    Full(DrumLayer),

    /// Rests for `bars / 2` bars, then plays for `bars / 2` bars
    FromMidpoint(DrumLayer),
}

impl LayerEntry {
    pub fn full(layer: DrumLayer) -> Self {
        LayerEntry::Full(layer)
    }

    pub fn from_midpoint(layer: DrumLayer) -> Self {
        LayerEntry::FromMidpoint(layer)
    }

    pub fn layer(&self) -> DrumLayer {
        match self {
            LayerEntry::Full(layer) | LayerEntry::FromMidpoint(layer) => *layer,
        }
    }

    /// First bar this layer sounds in, for a section of `bars` bars
    pub fn entry_bar(&self, bars: u32) -> u32 {
        match self {
            LayerEntry::Full(_) => 0,
            LayerEntry::FromMidpoint(_) => bars / 2,
        }
    }

    /// How many bars the layer plays; zero leaves it out
    pub fn layer_bars(&self, bars: u32) -> u32 {
        match self {
            LayerEntry::Full(_) => bars,
            LayerEntry::FromMidpoint(_) => bars / 2,
        }
    }
}

/// Where a fill lands inside its section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPlacement {
    /// Starts on the downbeat of the last bar
    LastBar(Fill),

    /// Starts this far into the last bar; whatever overhangs the section is clipped
    LastBarFrom(Fill, MusicalTime),
}

impl FillPlacement {
    pub fn fill(&self) -> Fill {
        match self {
            FillPlacement::LastBar(fill) | FillPlacement::LastBarFrom(fill, _) => *fill,
        }
    }

    /// Section-local offset of the fill in a section of `bars` bars
    pub fn offset(&self, bars: u32) -> MusicalTime {
        let last_bar = WHOLE * (bars - 1);
        match self {
            FillPlacement::LastBar(_) => last_bar,
            FillPlacement::LastBarFrom(_, at) => last_bar + *at,
        }
    }
}

/// Which lanes a section combines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecipe {
    /// Piano stab density (1.0 = every beat, below = beats 1 and 3)
    pub piano_density: f64,

    /// Bass line style
    pub bass: BassStyle,

    /// Drum layers, all merged onto the drum track
    pub drums: Vec<LayerEntry>,

    /// Optional transition fill
    pub fill: Option<FillPlacement>,
}

impl SectionRecipe {
    /// Render the recipe into one phrase per track
    pub fn generate(
        &self,
        kind: SectionKind,
        bars: u32,
        progression: &Progression,
    ) -> ArrangeResult<SectionBlock> {
        check_bars(bars)?;
        let span = MusicalTime::bars(bars);

        let piano = piano_stabs(progression, bars, self.piano_density)?;
        let bass = self.bass.generate(progression, bars)?;

        // Start from silence so the drum phrase always covers the section
        let mut drums = PhraseBuilder::new();
        drums.overlay(&Phrase::silence(bars)?, MusicalTime::ZERO);
        for entry in &self.drums {
            let layer_bars = entry.layer_bars(bars);
            if layer_bars == 0 {
                continue;
            }
            let layer = entry.layer().generate(layer_bars)?;
            drums.overlay(&layer, WHOLE * entry.entry_bar(bars));
        }
        if let Some(placement) = &self.fill {
            let fill = placement.fill().generate()?;
            drums.overlay(&fill, placement.offset(bars));
        }
        drums.clip(span);

        let mut parts = BTreeMap::new();
        parts.insert(PIANO_TRACK.to_string(), piano);
        parts.insert(BASS_TRACK.to_string(), bass);
        parts.insert(DRUMS_TRACK.to_string(), drums.finish());

        Ok(SectionBlock { kind, bars, parts })
    }
}

/// Output of a section generator
///
/// Every phrase starts at the section origin and spans exactly `bars` bars;
/// offsets of fills are already baked into the per-track phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionBlock {
    pub kind: SectionKind,

    /// Declared bar count (what the section reserves on the timeline)
    pub bars: u32,

    /// One phrase per track name
    pub parts: BTreeMap<String, Phrase>,
}

impl SectionBlock {
    /// Declared length of the section
    pub fn span(&self) -> MusicalTime {
        MusicalTime::bars(self.bars)
    }

    pub fn part(&self, track: &str) -> Option<&Phrase> {
        self.parts.get(track)
    }
}
