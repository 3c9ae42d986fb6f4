// MIDI Export - Convert songs to MIDI files using midly crate
// Produces a format-1 file: a meta track plus one track per song track

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::song::{Song, Track as SongTrack};
use crate::config::PERCUSSION_CHANNEL;
use crate::error::{ArrangeError, ArrangeResult};
use crate::groove::{MusicalTime, BEATS_PER_BAR, TICKS_PER_WHOLE};
use crate::sink::NoteSink;

/// Largest tick position a track can reach (28-bit delta times)
const MAX_TICK: u64 = 0x0FFF_FFFF;

/// Largest microseconds-per-quarter a tempo event can carry (24 bits)
const MAX_TEMPO_MICROS: f64 = 0xFF_FFFF as f64;

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiExportOptions {
    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ppq: u16,

    /// Include tempo metadata
    pub include_tempo: bool,

    /// Include time signature metadata
    pub include_time_signature: bool,

    /// Include track names
    pub track_names: bool,

    /// Velocity for every note (no dynamics are modeled)
    pub velocity: u8,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: 480,
            include_tempo: true,
            include_time_signature: true,
            track_names: true,
            velocity: 100,
        }
    }
}

/// Sink that encodes each accepted song to SMF bytes
#[derive(Debug, Default)]
pub struct MidiSink {
    pub options: MidiExportOptions,
    pub bytes: Vec<u8>,
}

impl MidiSink {
    pub fn new(options: MidiExportOptions) -> Self {
        MidiSink {
            options,
            bytes: Vec::new(),
        }
    }
}

impl NoteSink for MidiSink {
    fn accept(&mut self, song: &Song) -> ArrangeResult<()> {
        self.bytes = export_midi(song, &self.options)?;
        Ok(())
    }
}

/// Export a song to MIDI file bytes
pub fn export_midi(song: &Song, options: &MidiExportOptions) -> ArrangeResult<Vec<u8>> {
    if options.ppq == 0 || options.ppq > 0x7FFF {
        return Err(ArrangeError::Midi(format!("PPQ out of range: {}", options.ppq)));
    }

    let header = Header {
        format: midly::Format::Parallel,
        timing: Timing::Metrical(u15::new(options.ppq)),
    };

    let mut tracks = Vec::new();

    // Track 0: title, tempo and time signature
    let mut meta_track = Track::new();
    if options.track_names {
        push_meta(&mut meta_track, MetaMessage::TrackName(song.title.as_bytes()));
    }
    if options.include_tempo {
        let micros = tempo_micros(song.tempo_bpm)?;
        push_meta(&mut meta_track, MetaMessage::Tempo(u24::new(micros)));
    }
    if options.include_time_signature {
        push_meta(
            &mut meta_track,
            MetaMessage::TimeSignature(BEATS_PER_BAR as u8, 2, 24, 8),
        );
    }
    push_meta(&mut meta_track, MetaMessage::EndOfTrack);
    tracks.push(meta_track);

    let end_tick = to_midi_ticks(song.length, options.ppq)?;
    for track in &song.tracks {
        tracks.push(create_song_track(track, end_tick, options)?);
    }

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| ArrangeError::Midi(e.to_string()))?;

    Ok(bytes)
}

/// Export a song and write it to `path`
pub fn write_midi_file(song: &Song, path: &Path, options: &MidiExportOptions) -> ArrangeResult<()> {
    let bytes = export_midi(song, options)?;
    std::fs::write(path, &bytes)?;
    log::info!("MIDI exported: {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Create the MIDI track for one song track
fn create_song_track<'a>(
    track: &'a SongTrack,
    end_tick: u32,
    options: &MidiExportOptions,
) -> ArrangeResult<Track<'a>> {
    let channel = checked_u4(track.channel, "channel")?;
    let velocity = checked_u7(options.velocity, "velocity")?;

    let mut midi_track = Track::new();
    if options.track_names {
        push_meta(&mut midi_track, MetaMessage::TrackName(track.name.as_bytes()));
    }
    if track.channel != PERCUSSION_CHANNEL {
        midi_track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: checked_u7(track.program, "program")?,
                },
            },
        });
    }

    // (tick, note-offs sort before note-ons at the same tick, event)
    let mut events: Vec<(u32, u8, TrackEventKind<'a>)> = Vec::new();
    for note in track.timed_notes() {
        let Some(pitch) = note.pitch.midi() else {
            continue;
        };
        if pitch > 127 {
            log::warn!("Skipping out-of-range pitch {} on track {}", pitch, track.name);
            continue;
        }
        let key = u7::new(pitch);
        let tick_on = to_midi_ticks(note.start, options.ppq)?;
        let tick_off = to_midi_ticks(note.end(), options.ppq)?;

        events.push((
            tick_on,
            1,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel: velocity },
            },
        ));
        events.push((
            tick_off,
            0,
            TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel: u7::new(0) },
            },
        ));
    }
    events.sort_by_key(|(tick, order, _)| (*tick, *order));

    // Convert to delta times
    let mut last_tick = 0;
    for (tick, _, kind) in events {
        midi_track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind,
        });
        last_tick = tick;
    }

    midi_track.push(TrackEvent {
        delta: u28::new(end_tick.saturating_sub(last_tick)),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    Ok(midi_track)
}

/// Convert musical time to MIDI ticks at the given PPQ
///
/// Every position stays below `MAX_TICK`, so deltas between them fit too.
fn to_midi_ticks(time: MusicalTime, ppq: u16) -> ArrangeResult<u32> {
    let ticks_per_whole = ppq as u64 * BEATS_PER_BAR as u64;
    let ticks = time.ticks() as u64 * ticks_per_whole / TICKS_PER_WHOLE as u64;
    if ticks > MAX_TICK {
        return Err(ArrangeError::Midi(format!(
            "position {} is past the MIDI tick range at {} PPQ",
            time, ppq
        )));
    }
    Ok(ticks as u32)
}

/// Microseconds per quarter note
fn tempo_micros(bpm: f64) -> ArrangeResult<u32> {
    let micros = 60_000_000.0 / bpm;
    if !(1.0..=MAX_TEMPO_MICROS).contains(&micros) {
        return Err(ArrangeError::Midi(format!(
            "tempo {} BPM does not fit a MIDI tempo event",
            bpm
        )));
    }
    Ok(micros as u32)
}

fn push_meta<'a>(track: &mut Track<'a>, message: MetaMessage<'a>) {
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    });
}

fn checked_u4(value: u8, what: &str) -> ArrangeResult<u4> {
    if value > 15 {
        return Err(ArrangeError::Midi(format!("{} out of range: {}", what, value)));
    }
    Ok(u4::new(value))
}

fn checked_u7(value: u8, what: &str) -> ArrangeResult<u7> {
    if value > 127 {
        return Err(ArrangeError::Midi(format!("{} out of range: {}", what, value)));
    }
    Ok(u7::new(value))
}
