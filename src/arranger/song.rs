// Song - Assembled tracks ready for an output sink
// Phrases carry absolute start times; nothing here mutates after assembly

use serde::{Deserialize, Serialize};

use super::phrase::Phrase;
use crate::groove::{MusicalTime, TICKS_PER_WHOLE};
use crate::harmony::Pitch;

/// A note or rest at an absolute song position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedNote {
    pub start: MusicalTime,
    pub duration: MusicalTime,
    pub pitch: Pitch,
    pub channel: u8,
    pub program: u8,
}

impl TimedNote {
    pub fn end(&self) -> MusicalTime {
        self.start + self.duration
    }
}

/// An instrument track: channel, program and its phrases in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub program: u8,
    pub channel: u8,
    phrases: Vec<Phrase>,
}

impl Track {
    pub fn new(name: impl Into<String>, program: u8, channel: u8) -> Self {
        Track {
            name: name.into(),
            program,
            channel,
            phrases: Vec::new(),
        }
    }

    /// Append a phrase (its start time is already absolute)
    pub fn add_phrase(&mut self, phrase: Phrase) {
        self.phrases.push(phrase);
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    /// Latest phrase end on this track
    pub fn end(&self) -> MusicalTime {
        self.phrases
            .iter()
            .map(|p| p.end())
            .max()
            .unwrap_or(MusicalTime::ZERO)
    }

    /// Flatten into absolute events, rests included, ordered by start time
    pub fn timed_notes(&self) -> Vec<TimedNote> {
        let mut notes: Vec<TimedNote> = self
            .phrases
            .iter()
            .flat_map(|phrase| {
                phrase.events().iter().map(move |e| TimedNote {
                    start: phrase.start() + e.offset,
                    duration: e.duration,
                    pitch: e.pitch,
                    channel: self.channel,
                    program: self.program,
                })
            })
            .collect();
        notes.sort_by_key(|n| n.start);
        notes
    }
}

/// A fully assembled song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,

    /// Beats per minute
    pub tempo_bpm: f64,

    pub tracks: Vec<Track>,

    /// Sum of every section's declared length
    pub length: MusicalTime,
}

impl Song {
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.name == name)
    }

    /// Length in whole bars
    pub fn bar_count(&self) -> u32 {
        self.length.ticks() / TICKS_PER_WHOLE
    }

    /// Wall-clock length in milliseconds
    pub fn duration_ms(&self) -> f64 {
        self.length.to_ms(self.tempo_bpm)
    }

    /// Timed notes for every track, in track order
    pub fn timed_notes(&self) -> Vec<(&Track, Vec<TimedNote>)> {
        self.tracks.iter().map(|t| (t, t.timed_notes())).collect()
    }
}
