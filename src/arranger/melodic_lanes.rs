// Melodic Lanes - Piano stabs and basslines over the harmonic progression
// Every generator steps one progression chord per bar, wrapping

use serde::{Deserialize, Serialize};

use super::drum_lanes::check_bars;
use super::phrase::{Phrase, PhraseBuilder};
use crate::error::{ArrangeError, ArrangeResult};
use crate::groove::{BEATS_PER_BAR, EIGHTH, QUARTER, SIXTEENTH, SWING_DELAY};
use crate::harmony::{Pitch, Progression};

/// Bass line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BassStyle {
    /// No bass, written as explicit rests
    Silent,

    /// Root / octave on each half bar
    Groove,

    /// Groove with the offbeat octave swung late
    SwungGroove,

    /// Syncopated root/octave figure with extra root repeats
    Busy,
}

impl BassStyle {
    pub fn generate(&self, progression: &Progression, bars: u32) -> ArrangeResult<Phrase> {
        match self {
            BassStyle::Silent => {
                check_bars(bars)?;
                Phrase::silence(bars)
            }
            BassStyle::Groove => bass_groove(progression, bars, false),
            BassStyle::SwungGroove => bass_groove(progression, bars, true),
            BassStyle::Busy => bass_groove_busy(progression, bars),
        }
    }
}

/// Chord stabs on the beat
///
/// Density 1.0 and above strikes all four beats; anything below strikes
/// beats 1 and 3 only. Each beat is a sixteenth stab (or rest) followed by
/// a dotted-eighth rest.
pub fn piano_stabs(progression: &Progression, bars: u32, density: f64) -> ArrangeResult<Phrase> {
    check_bars(bars)?;
    if !density.is_finite() || density < 0.0 {
        return Err(ArrangeError::InvalidDensity(density));
    }

    let full = density >= 1.0;
    let mut builder = PhraseBuilder::new();
    for bar in 0..bars {
        let voicing = progression.step_for_bar(bar).stab_voicing();
        for beat in 0..BEATS_PER_BAR {
            if full || beat % 2 == 0 {
                builder.append_chord(&voicing, SIXTEENTH)?;
            } else {
                builder.rest(SIXTEENTH)?;
            }
            builder.rest(QUARTER - SIXTEENTH)?;
        }
    }
    Ok(builder.finish())
}

/// Sparse root/octave bassline, optionally swung
///
/// Per half bar: low root (eighth), rest, high root (sixteenth), rest
/// (quarter). Swing pushes the high root late without moving the bar lines.
pub fn bass_groove(progression: &Progression, bars: u32, swing: bool) -> ArrangeResult<Phrase> {
    check_bars(bars)?;

    let (gap, pickup) = if swing {
        (SIXTEENTH + SWING_DELAY, SIXTEENTH - SWING_DELAY)
    } else {
        (SIXTEENTH, SIXTEENTH)
    };

    let mut builder = PhraseBuilder::new();
    for bar in 0..bars {
        let step = progression.step_for_bar(bar);
        let low = Pitch::Note(step.root);
        let high = Pitch::Note(step.high_root());

        for _ in 0..2 {
            builder.append(low, EIGHTH)?;
            builder.rest(gap)?;
            builder.append(high, pickup)?;
            builder.rest(QUARTER)?;
        }
    }
    Ok(builder.finish())
}

/// Busier bassline with syncopated root repeats
pub fn bass_groove_busy(progression: &Progression, bars: u32) -> ArrangeResult<Phrase> {
    check_bars(bars)?;

    let mut builder = PhraseBuilder::new();
    for bar in 0..bars {
        let step = progression.step_for_bar(bar);
        let low = Pitch::Note(step.root);
        let high = Pitch::Note(step.high_root());

        let figure = [
            (low, EIGHTH),
            (high, EIGHTH),
            (low, SIXTEENTH),
            (Pitch::Rest, SIXTEENTH),
            (Pitch::Rest, EIGHTH),
            (low, EIGHTH),
            (high, EIGHTH),
            (high, SIXTEENTH),
            (Pitch::Rest, EIGHTH + SIXTEENTH),
        ];
        for (pitch, duration) in figure {
            builder.append(pitch, duration)?;
        }
    }
    Ok(builder.finish())
}
