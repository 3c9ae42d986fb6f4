// Pitch Resolver - Note names and MIDI numbers
// Maps "F3" / 64 / rest onto the pitches phrases carry

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArrangeError, ArrangeResult};

/// Semitone class for every spelling the resolver accepts
///
/// Enharmonic spellings share a class. Lookup is case-sensitive.
const NOTE_TO_SEMITONE: [(&str, u8); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// A resolved pitch: silence or a MIDI note number
///
/// Note numbers are not clamped; values above 127 pass through and
/// are left for the output sink to deal with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pitch {
    Rest,
    Note(u8),
}

impl Pitch {
    pub fn is_rest(&self) -> bool {
        matches!(self, Pitch::Rest)
    }

    /// MIDI note number, if sounding
    pub fn midi(&self) -> Option<u8> {
        match self {
            Pitch::Rest => None,
            Pitch::Note(n) => Some(*n),
        }
    }
}

impl From<u8> for Pitch {
    fn from(n: u8) -> Self {
        Pitch::Note(n)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pitch::Rest => write!(f, "rest"),
            Pitch::Note(n) => write!(f, "{}", n),
        }
    }
}

/// Unresolved pitch input: a raw number, a note name, or silence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PitchSpec {
    Midi(u8),
    Name(String),
    Rest,
}

impl From<u8> for PitchSpec {
    fn from(n: u8) -> Self {
        PitchSpec::Midi(n)
    }
}

impl From<&str> for PitchSpec {
    fn from(name: &str) -> Self {
        PitchSpec::Name(name.to_string())
    }
}

/// Resolve any pitch input to a concrete pitch
pub fn resolve(spec: &PitchSpec) -> ArrangeResult<Pitch> {
    match spec {
        PitchSpec::Rest => Ok(Pitch::Rest),
        PitchSpec::Midi(n) => Ok(Pitch::Note(*n)),
        PitchSpec::Name(name) => resolve_name(name).map(Pitch::Note),
    }
}

/// Resolve a note name such as "C4", "F#2" or "Bb3"
///
/// `value = (octave + 1) * 12 + semitone_class`
pub fn resolve_name(name: &str) -> ArrangeResult<u8> {
    let invalid = || ArrangeError::InvalidPitchName(name.to_string());

    let octave_char = name.chars().last().ok_or_else(invalid)?;
    let octave = octave_char.to_digit(10).ok_or_else(invalid)? as u8;
    let prefix = name[..name.len() - octave_char.len_utf8()].trim();

    let semitone = semitone_class(prefix).ok_or_else(invalid)?;
    Ok((octave + 1) * 12 + semitone)
}

/// Look up the semitone class of a note-name prefix
pub fn semitone_class(prefix: &str) -> Option<u8> {
    NOTE_TO_SEMITONE
        .iter()
        .find(|(name, _)| *name == prefix)
        .map(|(_, class)| *class)
}

/// Octave number of a MIDI note under the C4 = 60 convention
pub fn octave_of(note: u8) -> i32 {
    note as i32 / 12 - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pitches() {
        assert_eq!(resolve_name("C4").unwrap(), 60);
        assert_eq!(resolve_name("A4").unwrap(), 69);
        assert_eq!(resolve_name("F2").unwrap(), 41);
        assert_eq!(resolve_name("C0").unwrap(), 12);
    }

    #[test]
    fn test_integers_pass_through() {
        assert_eq!(resolve(&PitchSpec::Midi(64)).unwrap(), Pitch::Note(64));
        assert_eq!(resolve(&PitchSpec::Midi(0)).unwrap(), Pitch::Note(0));
        assert_eq!(resolve(&PitchSpec::Rest).unwrap(), Pitch::Rest);
    }

    #[test]
    fn test_enharmonic_equivalence() {
        assert_eq!(resolve_name("C#3").unwrap(), resolve_name("Db3").unwrap());
        assert_eq!(resolve_name("A#1").unwrap(), resolve_name("Bb1").unwrap());
        assert_eq!(resolve_name("G#5").unwrap(), resolve_name("Ab5").unwrap());
    }

    #[test]
    fn test_no_range_clamping() {
        // B9 lies above the MIDI window and is returned as-is
        assert_eq!(resolve_name("B9").unwrap(), 131);
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["", "H4", "c4", "C", "Cb4", "C#", "4", "E#x"] {
            let result = resolve_name(bad);
            assert!(
                matches!(result, Err(ArrangeError::InvalidPitchName(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_resolve_spec_name() {
        let spec = PitchSpec::from("Eb3");
        assert_eq!(resolve(&spec).unwrap(), Pitch::Note(51));
    }

    #[test]
    fn test_octave_of() {
        assert_eq!(octave_of(60), 4);
        assert_eq!(octave_of(59), 3);
        assert_eq!(octave_of(48), 3);
    }

    #[test]
    fn test_pitch_spec_deserialize() {
        let specs: Vec<PitchSpec> = serde_json::from_str(r#"[64, "C4", null]"#).unwrap();
        assert_eq!(specs[0], PitchSpec::Midi(64));
        assert_eq!(specs[1], PitchSpec::Name("C4".to_string()));
        assert_eq!(specs[2], PitchSpec::Rest);
    }
}
