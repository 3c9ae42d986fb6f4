// Harmonic Progression - Cyclic chord/root table for stabs and basslines
// One step per bar, wrapping modulo the progression length

use serde::{Deserialize, Serialize};

use super::pitch::{octave_of, resolve_name};
use crate::error::{ArrangeError, ArrangeResult};

/// Chord step as written in configuration: chord tones and a bass root, by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordSpec {
    pub tones: Vec<String>,
    pub root: String,
}

impl ChordSpec {
    pub fn new(tones: &[&str], root: &str) -> Self {
        ChordSpec {
            tones: tones.iter().map(|t| t.to_string()).collect(),
            root: root.to_string(),
        }
    }
}

/// The default house progression: Fm - Db - Ab - Eb
pub fn house_progression() -> Vec<ChordSpec> {
    vec![
        ChordSpec::new(&["F3", "Ab3", "C4"], "F2"),
        ChordSpec::new(&["Db3", "F3", "Ab3"], "Db2"),
        ChordSpec::new(&["Ab2", "C3", "Eb3"], "Ab1"),
        ChordSpec::new(&["Eb3", "G3", "Bb3"], "Eb2"),
    ]
}

/// A resolved chord step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordStep {
    /// Chord tones as written
    pub tones: Vec<u8>,

    /// Bass root (the "low" bass note)
    pub root: u8,
}

impl ChordStep {
    /// Bass root one octave up (the "high" bass note)
    pub fn high_root(&self) -> u8 {
        self.root + 12
    }

    /// Voicing used for piano stabs: octave-3 tones are lifted an octave
    pub fn stab_voicing(&self) -> Vec<u8> {
        self.tones
            .iter()
            .map(|&t| if octave_of(t) == 3 { t + 12 } else { t })
            .collect()
    }
}

/// A validated harmonic progression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    steps: Vec<ChordStep>,
}

impl Progression {
    /// Resolve and validate a progression table
    ///
    /// Chord tones that fail to parse are `InvalidPitchName`; a root that
    /// fails to parse is `MalformedRootPitch`. A root whose octave-up note
    /// would leave the u8 range is also malformed.
    pub fn from_specs(specs: &[ChordSpec]) -> ArrangeResult<Self> {
        if specs.is_empty() {
            return Err(ArrangeError::EmptyProgression);
        }

        let mut steps = Vec::with_capacity(specs.len());
        for spec in specs {
            let tones = spec
                .tones
                .iter()
                .map(|t| resolve_name(t))
                .collect::<ArrangeResult<Vec<u8>>>()?;

            let root = resolve_name(&spec.root)
                .ok()
                .filter(|r| r.checked_add(12).is_some())
                .ok_or_else(|| ArrangeError::MalformedRootPitch(spec.root.clone()))?;

            steps.push(ChordStep { tones, root });
        }

        Ok(Progression { steps })
    }

    /// The default house progression, resolved
    pub fn house() -> Self {
        Progression::from_specs(&house_progression())
            .unwrap_or_else(|_| unreachable!("built-in progression is valid"))
    }

    /// Number of steps before the progression repeats
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step sounding in the given bar (0-indexed), cycling
    pub fn step_for_bar(&self, bar: u32) -> &ChordStep {
        &self.steps[bar as usize % self.steps.len()]
    }

    pub fn steps(&self) -> &[ChordStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_progression_resolves() {
        let prog = Progression::house();
        assert_eq!(prog.len(), 4);

        // Fm: F3, Ab3, C4 over F2
        let first = &prog.steps()[0];
        assert_eq!(first.tones, vec![53, 56, 60]);
        assert_eq!(first.root, 41);
        assert_eq!(first.high_root(), 53);
    }

    #[test]
    fn test_stab_voicing_lifts_octave_three() {
        let prog = Progression::house();

        // F3 Ab3 C4 -> F4 Ab4 C4
        assert_eq!(prog.steps()[0].stab_voicing(), vec![65, 68, 60]);

        // Ab2 C3 Eb3 -> Ab2 C4 Eb4
        assert_eq!(prog.steps()[2].stab_voicing(), vec![44, 60, 63]);
    }

    #[test]
    fn test_step_for_bar_cycles() {
        let prog = Progression::house();
        for bar in 0..12 {
            assert_eq!(prog.step_for_bar(bar), prog.step_for_bar(bar + 4));
        }
        assert_eq!(prog.step_for_bar(5).root, prog.steps()[1].root);
    }

    #[test]
    fn test_empty_progression() {
        let result = Progression::from_specs(&[]);
        assert!(matches!(result, Err(ArrangeError::EmptyProgression)));
    }

    #[test]
    fn test_malformed_root() {
        let specs = vec![ChordSpec::new(&["C3", "E3", "G3"], "C")];
        let result = Progression::from_specs(&specs);
        assert!(matches!(result, Err(ArrangeError::MalformedRootPitch(r)) if r == "C"));
    }

    #[test]
    fn test_invalid_chord_tone() {
        let specs = vec![ChordSpec::new(&["C3", "X3", "G3"], "C2")];
        let result = Progression::from_specs(&specs);
        assert!(matches!(result, Err(ArrangeError::InvalidPitchName(n)) if n == "X3"));
    }

    #[test]
    fn test_chord_spec_deserialize() {
        let json = r#"[{"tones": ["C3", "E3", "G3"], "root": "C2"}]"#;
        let specs: Vec<ChordSpec> = serde_json::from_str(json).unwrap();
        let prog = Progression::from_specs(&specs).unwrap();
        assert_eq!(prog.steps()[0].root, 36);
    }
}
