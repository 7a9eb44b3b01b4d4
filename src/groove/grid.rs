// Musical Grid - Time signature, subdivisions and swing placement
// All positions are measured in quarter-note beats

use serde::{Deserialize, Serialize};
use std::fmt;

const GRID_EPSILON: f64 = 1e-9;

/// Musical time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl TimeSignature {
    /// 4/4 time
    pub const FOUR_FOUR: TimeSignature = TimeSignature { numerator: 4, denominator: 4 };

    /// 2/4 time - merengue
    pub const TWO_FOUR: TimeSignature = TimeSignature { numerator: 2, denominator: 4 };

    /// 3/4 time
    pub const THREE_FOUR: TimeSignature = TimeSignature { numerator: 3, denominator: 4 };

    /// Length of one bar in quarter-note beats
    pub fn beats_per_bar(&self) -> f64 {
        self.numerator as f64 * 4.0 / self.denominator as f64
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Grid subdivision a pattern is written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subdivision {
    /// Eighth notes (2 per beat)
    Eighth,

    /// Sixteenth notes (4 per beat)
    Sixteenth,
}

impl Subdivision {
    /// Number of subdivisions in a whole note (8 or 16)
    pub fn per_whole(&self) -> u32 {
        match self {
            Subdivision::Eighth => 8,
            Subdivision::Sixteenth => 16,
        }
    }

    /// Length of one subdivision in beats
    pub fn length_beats(&self) -> f64 {
        4.0 / self.per_whole() as f64
    }
}

/// Apply swing to an onset offset
///
/// Onsets sitting exactly on an odd subdivision are delayed by
/// `swing_amount * subdivision_length`. Everything else is untouched.
pub fn swung_offset(offset: f64, subdivision: Subdivision, swing_amount: f64) -> f64 {
    if swing_amount <= 0.0 {
        return offset;
    }

    let length = subdivision.length_beats();
    let position = offset / length;
    let nearest = position.round();

    let on_grid = (position - nearest).abs() < GRID_EPSILON;
    if on_grid && (nearest as i64).rem_euclid(2) == 1 {
        offset + swing_amount * length
    } else {
        offset
    }
}
