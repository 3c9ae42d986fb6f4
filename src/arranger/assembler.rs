// Score Assembler - Places sections along the global timeline
// Walks the song structure and advances by each section's declared length

use super::sections::SectionKind;
use super::phrase::Phrase;
use super::song::{Song, Track};
use crate::config::{SongConfig, StructureToken};
use crate::error::{ArrangeError, ArrangeResult};
use crate::groove::MusicalTime;
use crate::harmony::Progression;

/// A structure token resolved to a section kind and a positive bar count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSection {
    pub kind: SectionKind,
    pub bars: u32,
}

/// Resolve every structure token up front
///
/// Fails on the first unknown section name or invalid bar count, so no
/// generation happens for a structure that cannot be built. A bar count is
/// invalid when it is not a positive whole number, or when it would push
/// the song past the tick range of `MusicalTime`.
pub fn plan_structure(
    structure: &[StructureToken],
    default_bars: u32,
) -> ArrangeResult<Vec<PlannedSection>> {
    let mut plan = Vec::with_capacity(structure.len());
    let mut total = MusicalTime::ZERO;

    for token in structure {
        let kind: SectionKind = token.name().parse()?;
        let requested = token.bars_or(default_bars)?;
        let invalid = || ArrangeError::InvalidBarCount(requested as f64);

        let bars = u32::try_from(requested)
            .ok()
            .filter(|&b| b > 0)
            .ok_or_else(invalid)?;
        total = MusicalTime::checked_bars(bars)
            .and_then(|span| total.checked_add(span))
            .ok_or_else(invalid)?;

        plan.push(PlannedSection { kind, bars });
    }

    Ok(plan)
}

/// Build a complete song from its configuration
///
/// Every section returns one phrase per track starting at the section
/// origin; the assembler moves it to the cursor and advances the cursor by
/// the section's declared bar count. Declared tracks a section leaves
/// untouched get explicit silence so every track covers the whole song.
pub fn build_song(config: &SongConfig) -> ArrangeResult<Song> {
    if !config.tempo_bpm.is_finite() || config.tempo_bpm <= 0.0 {
        return Err(ArrangeError::InvalidTempo(config.tempo_bpm));
    }

    let progression = Progression::from_specs(&config.progression)?;
    let plan = plan_structure(&config.structure, config.default_bars)?;

    let mut tracks: Vec<Track> = config
        .tracks
        .iter()
        .map(|spec| Track::new(spec.name.clone(), spec.program, spec.channel))
        .collect();

    let mut cursor = MusicalTime::ZERO;
    for section in &plan {
        let block = section.kind.generate(section.bars, &progression)?;
        let fixed_duration = MusicalTime::bars(block.bars);

        for (name, mut phrase) in block.parts {
            let track = tracks
                .iter_mut()
                .find(|t| t.name == name)
                .ok_or_else(|| ArrangeError::UnknownTrack(name.clone()))?;
            phrase.set_start(cursor);
            track.add_phrase(phrase);
        }

        for track in tracks.iter_mut().filter(|t| t.end() < cursor + fixed_duration) {
            let mut rest = Phrase::silence(block.bars)?;
            rest.set_start(cursor);
            track.add_phrase(rest);
        }

        log::debug!(
            "Placed {} ({} bars) at bar {}",
            section.kind,
            block.bars,
            cursor.as_whole_notes()
        );
        cursor += fixed_duration;
    }

    let song = Song {
        title: config.title.clone(),
        tempo_bpm: config.tempo_bpm,
        tracks,
        length: cursor,
    };

    log::info!(
        "Assembled '{}': {} sections, {} bars, {} tracks at {} BPM",
        song.title,
        plan.len(),
        song.bar_count(),
        song.tracks.len(),
        song.tempo_bpm
    );

    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arranger::drum_lanes::MIDI_KICK;
    use crate::arranger::sections::{BASS_TRACK, DRUMS_TRACK, PIANO_TRACK};
    use crate::config::TrackSpec;
    use crate::groove::WHOLE;
    use crate::harmony::{ChordSpec, Pitch};

    fn config_with(structure: Vec<StructureToken>) -> SongConfig {
        SongConfig {
            structure,
            ..SongConfig::default()
        }
    }

    #[test]
    fn test_plan_structure() {
        let tokens = vec![
            StructureToken::named("verse"),
            StructureToken::sized("Chorus", 8),
        ];
        let plan = plan_structure(&tokens, 4).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedSection { kind: SectionKind::Verse, bars: 4 },
                PlannedSection { kind: SectionKind::Chorus, bars: 8 },
            ]
        );
    }

    #[test]
    fn test_plan_rejects_bad_bars() {
        for bars in [0, -3, i64::from(u32::MAX) + 1] {
            let result = plan_structure(&[StructureToken::sized("verse", bars)], 4);
            assert!(matches!(result, Err(ArrangeError::InvalidBarCount(b)) if b == bars as f64));
        }

        let result = plan_structure(&[StructureToken::named("verse")], 0);
        assert!(matches!(result, Err(ArrangeError::InvalidBarCount(b)) if b == 0.0));
    }

    #[test]
    fn test_plan_rejects_song_past_tick_range() {
        // One section too long on its own
        let result = plan_structure(&[StructureToken::sized("verse", 3_000_000)], 4);
        assert!(matches!(result, Err(ArrangeError::InvalidBarCount(b)) if b == 3_000_000.0));

        // Each section fits, their sum does not
        let tokens = vec![
            StructureToken::sized("verse", 2_000_000),
            StructureToken::sized("chorus", 2_000_000),
        ];
        let result = plan_structure(&tokens, 4);
        assert!(matches!(result, Err(ArrangeError::InvalidBarCount(b)) if b == 2_000_000.0));
    }

    #[test]
    fn test_oversized_section_fails_build() {
        let config = config_with(vec![StructureToken::sized("verse", 3_000_000)]);
        assert!(matches!(build_song(&config), Err(ArrangeError::InvalidBarCount(_))));
    }

    #[test]
    fn test_fractional_bar_count_fails_build() {
        let config =
            SongConfig::from_json_str(r#"{"structure": ["intro", ["verse", 2.5]]}"#).unwrap();
        assert!(matches!(
            build_song(&config),
            Err(ArrangeError::InvalidBarCount(b)) if b == 2.5
        ));
    }

    #[test]
    fn test_unknown_section_fails_before_generation() {
        let config = config_with(vec![
            StructureToken::sized("intro", 2),
            StructureToken::named("breakdown"),
        ]);
        let result = build_song(&config);
        assert!(matches!(result, Err(ArrangeError::UnknownSectionName(n)) if n == "breakdown"));
    }

    #[test]
    fn test_intro_scenario() {
        let config = config_with(vec![StructureToken::sized("intro", 2)]);
        let song = build_song(&config).unwrap();

        assert_eq!(song.tempo_bpm, 124.0);
        assert_eq!(song.tracks.len(), 3);
        assert_eq!(song.length, WHOLE * 2);

        // Kick enters at the intro's midpoint
        let drums = song.track(DRUMS_TRACK).unwrap().timed_notes();
        let first_kick = drums
            .iter()
            .find(|n| n.pitch == Pitch::Note(MIDI_KICK))
            .unwrap();
        assert_eq!(first_kick.start, WHOLE);
        assert_eq!(first_kick.channel, 9);
    }

    #[test]
    fn test_verse_opens_on_kick() {
        let config = config_with(vec![StructureToken::sized("verse", 1)]);
        let song = build_song(&config).unwrap();

        let drums = song.track(DRUMS_TRACK).unwrap().timed_notes();
        let first = drums.iter().find(|n| !n.pitch.is_rest()).unwrap();
        assert_eq!(first.start, MusicalTime::ZERO);
        assert_eq!(first.pitch, Pitch::Note(MIDI_KICK));
    }

    #[test]
    fn test_timeline_additivity() {
        let config = SongConfig::default();
        let song = build_song(&config).unwrap();

        assert_eq!(song.length, WHOLE * 68);
        assert_eq!(song.bar_count(), 68);
        for track in &song.tracks {
            assert_eq!(track.phrases().len(), config.structure.len());
            assert!(track.phrases().iter().all(|p| p.end() <= song.length));
            assert_eq!(track.end(), song.length);
        }
    }

    #[test]
    fn test_phrases_tile_without_gaps() {
        let config = config_with(vec![
            StructureToken::named("intro"),
            StructureToken::sized("pre", 3),
            StructureToken::sized("bridge", 1),
            StructureToken::named("outro"),
        ]);
        let song = build_song(&config).unwrap();
        assert_eq!(song.length, WHOLE * 12);

        for track in &song.tracks {
            let mut expected_start = MusicalTime::ZERO;
            for phrase in track.phrases() {
                assert_eq!(phrase.start(), expected_start, "track {}", track.name);
                expected_start = phrase.end();
            }
            assert_eq!(expected_start, song.length);
        }
    }

    #[test]
    fn test_fill_offset_survives_placement() {
        let config = config_with(vec![
            StructureToken::sized("verse", 2),
            StructureToken::sized("pre", 4),
        ]);
        let song = build_song(&config).unwrap();
        let drums = song.track(DRUMS_TRACK).unwrap().timed_notes();

        // Tom run starts on the pre-chorus's last bar: bar 2 + 3
        let first_tom = drums.iter().find(|n| n.pitch == Pitch::Note(45)).unwrap();
        assert_eq!(first_tom.start, WHOLE * 5);
    }

    #[test]
    fn test_undeclared_track_rejected() {
        let config = SongConfig {
            tracks: vec![TrackSpec::new(PIANO_TRACK, 4, 0), TrackSpec::new(BASS_TRACK, 33, 1)],
            ..config_with(vec![StructureToken::named("verse")])
        };
        let result = build_song(&config);
        assert!(matches!(result, Err(ArrangeError::UnknownTrack(n)) if n == DRUMS_TRACK));
    }

    #[test]
    fn test_extra_track_padded_with_silence() {
        let mut tracks = crate::config::default_tracks();
        tracks.push(TrackSpec::new("PAD", 89, 2));
        let config = SongConfig {
            tracks,
            ..config_with(vec![StructureToken::sized("verse", 2), StructureToken::named("outro")])
        };

        let song = build_song(&config).unwrap();
        let pad = song.track("PAD").unwrap();
        assert_eq!(pad.phrases().len(), 2);
        assert_eq!(pad.end(), song.length);
        assert!(pad.timed_notes().iter().all(|n| n.pitch.is_rest()));
    }

    #[test]
    fn test_invalid_tempo() {
        for tempo in [0.0, -120.0, f64::NAN] {
            let config = SongConfig {
                tempo_bpm: tempo,
                ..SongConfig::default()
            };
            assert!(matches!(build_song(&config), Err(ArrangeError::InvalidTempo(_))));
        }
    }

    #[test]
    fn test_malformed_progression_aborts_build() {
        let config = SongConfig {
            progression: vec![ChordSpec::new(&["C3", "E3", "G3"], "Cx")],
            ..SongConfig::default()
        };
        assert!(matches!(
            build_song(&config),
            Err(ArrangeError::MalformedRootPitch(r)) if r == "Cx"
        ));
    }

    #[test]
    fn test_build_deterministic() {
        let config = SongConfig::default();
        assert_eq!(build_song(&config).unwrap(), build_song(&config).unwrap());
    }

    #[test]
    fn test_empty_structure() {
        let song = build_song(&config_with(vec![])).unwrap();
        assert_eq!(song.length, MusicalTime::ZERO);
        assert!(song.tracks.iter().all(|t| t.phrases().is_empty()));
    }
}
