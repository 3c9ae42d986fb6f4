// Musical Grid - Fixed-point musical time and the 16-slot bar grid
// Provides the duration constants every generator builds from

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Ticks in one whole note (one 4/4 bar)
///
/// Divisible by 16 (sixteenth slots) and by 3 (swing offset).
pub const TICKS_PER_WHOLE: u32 = 1920;

/// Number of sixteenth-note slots in one bar
pub const SLOTS_PER_BAR: usize = 16;

/// Beats (quarter notes) in one bar
pub const BEATS_PER_BAR: u32 = 4;

/// A point or span of musical time, in ticks of `1/TICKS_PER_WHOLE` whole notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MusicalTime(u32);

pub const WHOLE: MusicalTime = MusicalTime(TICKS_PER_WHOLE);
pub const HALF: MusicalTime = MusicalTime(TICKS_PER_WHOLE / 2);
pub const QUARTER: MusicalTime = MusicalTime(TICKS_PER_WHOLE / 4);
pub const EIGHTH: MusicalTime = MusicalTime(TICKS_PER_WHOLE / 8);
pub const SIXTEENTH: MusicalTime = MusicalTime(TICKS_PER_WHOLE / 16);

/// How far a swung offbeat is pushed late: a third of a sixteenth
pub const SWING_DELAY: MusicalTime = MusicalTime(TICKS_PER_WHOLE / 48);

impl MusicalTime {
    pub const ZERO: MusicalTime = MusicalTime(0);

    /// Create from raw ticks
    pub const fn from_ticks(ticks: u32) -> Self {
        MusicalTime(ticks)
    }

    /// Span of `bars` whole bars
    pub const fn bars(bars: u32) -> Self {
        MusicalTime(bars * TICKS_PER_WHOLE)
    }

    /// Span of `bars` whole bars, or `None` past the tick range
    pub const fn checked_bars(bars: u32) -> Option<Self> {
        match bars.checked_mul(TICKS_PER_WHOLE) {
            Some(ticks) => Some(MusicalTime(ticks)),
            None => None,
        }
    }

    pub fn checked_add(self, other: MusicalTime) -> Option<MusicalTime> {
        self.0.checked_add(other.0).map(MusicalTime)
    }

    /// Raw tick count
    pub const fn ticks(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Value in whole notes (bars)
    pub fn as_whole_notes(self) -> f64 {
        self.0 as f64 / TICKS_PER_WHOLE as f64
    }

    /// Value in quarter-note beats
    pub fn as_beats(self) -> f64 {
        self.as_whole_notes() * BEATS_PER_BAR as f64
    }

    /// Wall-clock length in milliseconds at the given tempo
    pub fn to_ms(self, bpm: f64) -> f64 {
        let ms_per_beat = 60000.0 / bpm;
        self.as_beats() * ms_per_beat
    }
}

impl Add for MusicalTime {
    type Output = MusicalTime;

    fn add(self, other: MusicalTime) -> MusicalTime {
        MusicalTime(self.0 + other.0)
    }
}

impl AddAssign for MusicalTime {
    fn add_assign(&mut self, other: MusicalTime) {
        self.0 += other.0;
    }
}

impl Sub for MusicalTime {
    type Output = MusicalTime;

    fn sub(self, other: MusicalTime) -> MusicalTime {
        MusicalTime(self.0 - other.0)
    }
}

impl Mul<u32> for MusicalTime {
    type Output = MusicalTime;

    fn mul(self, n: u32) -> MusicalTime {
        MusicalTime(self.0 * n)
    }
}

impl fmt::Display for MusicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, TICKS_PER_WHOLE)
    }
}

/// A set of hit positions on the 16-slot bar grid, one bit per slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitMask(u16);

impl HitMask {
    pub const EMPTY: HitMask = HitMask(0);
    pub const ALL: HitMask = HitMask(u16::MAX);

    /// Build a mask from slot indices (0..16)
    pub const fn from_slots(slots: &[usize]) -> Self {
        let mut bits = 0u16;
        let mut i = 0;
        while i < slots.len() {
            bits |= 1 << slots[i];
            i += 1;
        }
        HitMask(bits)
    }

    /// Whether the slot sounds
    pub fn contains(self, slot: usize) -> bool {
        slot < SLOTS_PER_BAR && self.0 & (1 << slot) != 0
    }

    /// Number of hit slots per bar
    pub fn hit_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Slot indices in ascending order
    pub fn slots(self) -> Vec<usize> {
        (0..SLOTS_PER_BAR).filter(|&s| self.contains(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_constants_tile_a_bar() {
        assert_eq!(SIXTEENTH * 16, WHOLE);
        assert_eq!(EIGHTH * 2, QUARTER);
        assert_eq!(SIXTEENTH * 4, QUARTER);
        assert_eq!(QUARTER * 2, HALF);
        assert_eq!(HALF * 2, WHOLE);
        assert_eq!(SWING_DELAY * 3, SIXTEENTH);
    }

    #[test]
    fn test_bars() {
        assert_eq!(MusicalTime::bars(3), WHOLE * 3);
        assert_eq!(MusicalTime::bars(0), MusicalTime::ZERO);
        assert_eq!(MusicalTime::bars(2).as_whole_notes(), 2.0);
    }

    #[test]
    fn test_checked_bars_overflow() {
        assert_eq!(MusicalTime::checked_bars(3), Some(WHOLE * 3));
        assert_eq!(MusicalTime::checked_bars(3_000_000), None);

        let near_limit = MusicalTime::checked_bars(2_000_000).unwrap();
        assert_eq!(near_limit.checked_add(near_limit), None);
        assert_eq!(WHOLE.checked_add(QUARTER), Some(WHOLE + QUARTER));
    }

    #[test]
    fn test_to_ms_120_bpm() {
        // At 120 BPM, each beat is 500ms and a bar is 2000ms
        assert!((QUARTER.to_ms(120.0) - 500.0).abs() < 0.01);
        assert!((WHOLE.to_ms(120.0) - 2000.0).abs() < 0.01);
        assert!((MusicalTime::bars(4).to_ms(120.0) - 8000.0).abs() < 0.01);
    }

    #[test]
    fn test_hit_mask() {
        let kick = HitMask::from_slots(&[0, 4, 8, 12]);
        assert!(kick.contains(0));
        assert!(kick.contains(12));
        assert!(!kick.contains(1));
        assert!(!kick.contains(16));
        assert_eq!(kick.hit_count(), 4);
        assert_eq!(kick.slots(), vec![0, 4, 8, 12]);

        assert_eq!(HitMask::ALL.hit_count(), 16);
        assert_eq!(HitMask::EMPTY.hit_count(), 0);
    }
}
