// Groove - Musical time and the sixteenth-note grid

pub mod grid;

pub use grid::{
    HitMask, MusicalTime, BEATS_PER_BAR, EIGHTH, HALF, QUARTER, SIXTEENTH, SLOTS_PER_BAR,
    SWING_DELAY, TICKS_PER_WHOLE, WHOLE,
};
