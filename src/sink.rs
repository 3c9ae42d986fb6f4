// Output sinks
// Anything that consumes a finished song: file writers, players, test collectors

use crate::arranger::song::{Song, TimedNote};
use crate::error::ArrangeResult;

/// Consumer of an assembled song
pub trait NoteSink {
    fn accept(&mut self, song: &Song) -> ArrangeResult<()>;
}

/// A track's flattened events as received by a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedTrack {
    pub name: String,
    pub notes: Vec<TimedNote>,
}

/// Keeps every received song's events in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub tracks: Vec<CollectedTrack>,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink::default()
    }

    pub fn track(&self, name: &str) -> Option<&CollectedTrack> {
        self.tracks.iter().find(|t| t.name == name)
    }
}

impl NoteSink for CollectingSink {
    fn accept(&mut self, song: &Song) -> ArrangeResult<()> {
        for (track, notes) in song.timed_notes() {
            self.tracks.push(CollectedTrack {
                name: track.name.clone(),
                notes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arranger::build_song;
    use crate::config::{SongConfig, StructureToken};
    use crate::groove::{MusicalTime, WHOLE};

    #[test]
    fn test_collecting_sink() {
        let config = SongConfig {
            structure: vec![StructureToken::sized("chorus", 2)],
            ..SongConfig::default()
        };
        let song = build_song(&config).unwrap();

        let mut sink = CollectingSink::new();
        sink.accept(&song).unwrap();

        assert_eq!(sink.tracks.len(), 3);
        let bass = sink.track("BASS").unwrap();
        assert!(bass.notes.windows(2).all(|w| w[0].start <= w[1].start));
        assert!(bass.notes.iter().all(|n| n.end() <= WHOLE * 2));

        // Monophonic line: durations tile the section exactly
        let total = bass
            .notes
            .iter()
            .fold(MusicalTime::ZERO, |acc, n| acc + n.duration);
        assert_eq!(total, WHOLE * 2);
    }
}
