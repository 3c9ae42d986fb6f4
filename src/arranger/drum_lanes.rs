// Drum Lanes - Grid-based percussion layers and fills
// Each layer walks the 16-slot grid; fills are short hand-written phrases

use serde::{Deserialize, Serialize};

use super::phrase::{Phrase, PhraseBuilder};
use crate::error::{ArrangeError, ArrangeResult};
use crate::groove::{HitMask, MusicalTime, EIGHTH, SIXTEENTH, SLOTS_PER_BAR};
use crate::harmony::Pitch;

/// General MIDI note numbers for drums
pub const MIDI_KICK: u8 = 36;         // C1
pub const MIDI_CLAP: u8 = 39;         // D#1
pub const MIDI_ELECTRIC_SNARE: u8 = 40; // E1
pub const MIDI_CLOSED_HIHAT: u8 = 42; // F#1
pub const MIDI_LOW_TOM: u8 = 45;      // A1
pub const MIDI_OPEN_HIHAT: u8 = 46;   // A#1
pub const MIDI_LOW_MID_TOM: u8 = 47;  // B1
pub const MIDI_HIGH_MID_TOM: u8 = 48; // C2
pub const MIDI_CRASH: u8 = 49;        // C#2
pub const MIDI_SHAKER: u8 = 70;       // A#3

/// Four on the floor
pub const KICK_HITS: HitMask = HitMask::from_slots(&[0, 4, 8, 12]);
/// Backbeat on 2 and 4
pub const CLAP_HITS: HitMask = HitMask::from_slots(&[4, 12]);
/// The "and" of every beat
pub const OFFBEAT_HAT_HITS: HitMask = HitMask::from_slots(&[2, 6, 10, 14]);
/// Every odd sixteenth
pub const CLOSED_HAT_HITS: HitMask = HitMask::from_slots(&[1, 3, 5, 7, 9, 11, 13, 15]);
/// Every sixteenth
pub const SHAKER_HITS: HitMask = HitMask::ALL;

/// Percussion layers that repeat bar after bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumLayer {
    Kick,
    Clap,
    OffbeatHat,
    ClosedHat,
    Shaker,
}

impl DrumLayer {
    /// MIDI drum voice for this layer
    pub fn midi_note(&self) -> u8 {
        match self {
            DrumLayer::Kick => MIDI_KICK,
            DrumLayer::Clap => MIDI_CLAP,
            DrumLayer::OffbeatHat => MIDI_OPEN_HIHAT,
            DrumLayer::ClosedHat => MIDI_CLOSED_HIHAT,
            DrumLayer::Shaker => MIDI_SHAKER,
        }
    }

    /// Slots that sound in every bar
    pub fn hits(&self) -> HitMask {
        match self {
            DrumLayer::Kick => KICK_HITS,
            DrumLayer::Clap => CLAP_HITS,
            DrumLayer::OffbeatHat => OFFBEAT_HAT_HITS,
            DrumLayer::ClosedHat => CLOSED_HAT_HITS,
            DrumLayer::Shaker => SHAKER_HITS,
        }
    }

    /// Generate this layer for `bars` bars
    pub fn generate(&self, bars: u32) -> ArrangeResult<Phrase> {
        grid_layer(self.midi_note(), self.hits(), bars)
    }
}

/// One-shot transition phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// Tom run, placed at the start of the last bar
    TomRun,

    /// Snare roll into a crash, placed on beat 2 of the last bar
    SnareRoll,
}

impl Fill {
    pub fn generate(&self) -> ArrangeResult<Phrase> {
        match self {
            Fill::TomRun => tom_fill_1bar(),
            Fill::SnareRoll => snare_roll(),
        }
    }
}

/// Walk the 16-slot grid for `bars` bars: `pitch` on hit slots, rests elsewhere
pub fn grid_layer(pitch: u8, hits: HitMask, bars: u32) -> ArrangeResult<Phrase> {
    check_bars(bars)?;

    let mut builder = PhraseBuilder::new();
    for _ in 0..bars {
        for slot in 0..SLOTS_PER_BAR {
            let sound = if hits.contains(slot) {
                Pitch::Note(pitch)
            } else {
                Pitch::Rest
            };
            builder.append(sound, SIXTEENTH)?;
        }
    }
    Ok(builder.finish())
}

pub fn house_kick(bars: u32) -> ArrangeResult<Phrase> {
    DrumLayer::Kick.generate(bars)
}

pub fn house_clap(bars: u32) -> ArrangeResult<Phrase> {
    DrumLayer::Clap.generate(bars)
}

pub fn hat_offbeat(bars: u32) -> ArrangeResult<Phrase> {
    DrumLayer::OffbeatHat.generate(bars)
}

pub fn hat_closed_16(bars: u32) -> ArrangeResult<Phrase> {
    DrumLayer::ClosedHat.generate(bars)
}

pub fn shaker_16(bars: u32) -> ArrangeResult<Phrase> {
    DrumLayer::Shaker.generate(bars)
}

/// Eight-hit tom run spanning eleven sixteenths, starting at zero
pub fn tom_fill_1bar() -> ArrangeResult<Phrase> {
    let seq = [
        (Pitch::Note(MIDI_LOW_TOM), SIXTEENTH),
        (Pitch::Note(MIDI_LOW_MID_TOM), SIXTEENTH),
        (Pitch::Note(MIDI_HIGH_MID_TOM), EIGHTH),
        (Pitch::Rest, SIXTEENTH),
        (Pitch::Note(MIDI_LOW_TOM), SIXTEENTH),
        (Pitch::Note(MIDI_LOW_MID_TOM), SIXTEENTH),
        (Pitch::Note(MIDI_HIGH_MID_TOM), EIGHTH),
        (Pitch::Note(MIDI_CRASH), EIGHTH),
    ];

    let mut builder = PhraseBuilder::new();
    for (pitch, duration) in seq {
        builder.append(pitch, duration)?;
    }
    Ok(builder.finish())
}

/// Fourteen sixteenth snares, a held snare, then a crash, starting at zero
pub fn snare_roll() -> ArrangeResult<Phrase> {
    let mut builder = PhraseBuilder::new();
    for _ in 0..14 {
        builder.append(Pitch::Note(MIDI_ELECTRIC_SNARE), SIXTEENTH)?;
    }
    builder.append(Pitch::Note(MIDI_ELECTRIC_SNARE), EIGHTH)?;
    builder.append(Pitch::Note(MIDI_CRASH), EIGHTH)?;
    Ok(builder.finish())
}

pub(crate) fn check_bars(bars: u32) -> ArrangeResult<()> {
    if bars == 0 || MusicalTime::checked_bars(bars).is_none() {
        return Err(ArrangeError::InvalidBarCount(bars as f64));
    }
    Ok(())
}
