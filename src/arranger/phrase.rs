// Phrase - Timed note/rest sequences on one track
// PhraseBuilder accumulates events behind an insertion cursor; Phrase is the result

use serde::{Deserialize, Serialize};

use crate::error::{ArrangeError, ArrangeResult};
use crate::groove::{MusicalTime, WHOLE};
use crate::harmony::Pitch;

/// A single note or rest inside a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Offset from the phrase start
    pub offset: MusicalTime,

    /// Sounding pitch or rest
    pub pitch: Pitch,

    /// How long the event lasts
    pub duration: MusicalTime,
}

impl NoteEvent {
    /// Offset at which this event stops
    pub fn end(&self) -> MusicalTime {
        self.offset + self.duration
    }
}

/// Accumulates note events for one phrase
#[derive(Debug, Clone, Default)]
pub struct PhraseBuilder {
    start: MusicalTime,
    events: Vec<NoteEvent>,
    cursor: MusicalTime,
}

impl PhraseBuilder {
    /// Create an empty builder starting at time zero
    pub fn new() -> Self {
        PhraseBuilder::default()
    }

    /// Append one note or rest at the cursor and advance the cursor
    pub fn append(&mut self, pitch: Pitch, duration: MusicalTime) -> ArrangeResult<()> {
        check_duration(duration)?;
        self.events.push(NoteEvent {
            offset: self.cursor,
            pitch,
            duration,
        });
        self.cursor += duration;
        Ok(())
    }

    /// Append a rest
    pub fn rest(&mut self, duration: MusicalTime) -> ArrangeResult<()> {
        self.append(Pitch::Rest, duration)
    }

    /// Strike every tone at the cursor, then advance once
    ///
    /// An empty chord is written as a rest so the cursor still moves.
    pub fn append_chord(&mut self, tones: &[u8], duration: MusicalTime) -> ArrangeResult<()> {
        check_duration(duration)?;
        if tones.is_empty() {
            return self.rest(duration);
        }
        for &tone in tones {
            self.events.push(NoteEvent {
                offset: self.cursor,
                pitch: Pitch::Note(tone),
                duration,
            });
        }
        self.cursor += duration;
        Ok(())
    }

    /// Set the phrase's offset from its owner's origin
    pub fn set_start(&mut self, start: MusicalTime) {
        self.start = start;
    }

    /// Lay another phrase over this one, `offset` after this phrase's start
    ///
    /// The other phrase's own start is ignored. The cursor moves to the
    /// later of its current position and the end of the overlaid phrase.
    pub fn overlay(&mut self, other: &Phrase, offset: MusicalTime) {
        self.events.extend(other.events.iter().map(|e| NoteEvent {
            offset: e.offset + offset,
            ..*e
        }));
        self.cursor = self.cursor.max(offset + other.span());
        self.sort_by_offset();
    }

    /// Drop everything at or past `limit`, shortening events that cross it
    pub fn clip(&mut self, limit: MusicalTime) {
        self.events.retain(|e| e.offset < limit);
        for event in &mut self.events {
            if event.end() > limit {
                event.duration = limit - event.offset;
            }
        }
        self.cursor = self.cursor.min(limit);
    }

    /// Current cursor position (phrase-local)
    pub fn cursor(&self) -> MusicalTime {
        self.cursor
    }

    /// Freeze into an immutable phrase
    pub fn finish(self) -> Phrase {
        Phrase {
            start: self.start,
            events: self.events,
            span: self.cursor,
        }
    }

    fn sort_by_offset(&mut self) {
        // Stable, so simultaneous events keep insertion order
        self.events.sort_by_key(|e| e.offset);
    }
}

fn check_duration(duration: MusicalTime) -> ArrangeResult<()> {
    if duration.is_zero() {
        return Err(ArrangeError::InvalidDuration(duration.ticks()));
    }
    Ok(())
}

/// A finished phrase: note events plus a start time on the owning track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    start: MusicalTime,
    events: Vec<NoteEvent>,
    span: MusicalTime,
}

impl Phrase {
    /// A phrase of explicit silence, `bars` bars long
    pub fn silence(bars: u32) -> ArrangeResult<Self> {
        let mut builder = PhraseBuilder::new();
        for _ in 0..bars {
            builder.rest(WHOLE)?;
        }
        Ok(builder.finish())
    }

    /// Offset from the owning track's origin
    pub fn start(&self) -> MusicalTime {
        self.start
    }

    /// Override the start offset
    pub fn set_start(&mut self, start: MusicalTime) {
        self.start = start;
    }

    /// Length covered by the phrase's cursor
    pub fn span(&self) -> MusicalTime {
        self.span
    }

    /// Absolute end on the owning track
    pub fn end(&self) -> MusicalTime {
        self.start + self.span
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sounding events only
    pub fn notes(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(|e| !e.pitch.is_rest())
    }
}
