// Pitch Space - Root-relative scale and chord derivation
// Everything here is a pure function of its inputs and the engine config

pub mod chords;
pub mod space;

use thiserror::Error;

/// Errors raised while deriving pitches
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchError {
    #[error("Invalid pitch: letter '{letter}' at octave {octave}")]
    InvalidPitch { letter: char, octave: i32 },

    #[error("Invalid chord symbol: '{0}'")]
    InvalidChord(String),

    #[error("Pitch {pitch} is outside the supported register")]
    PitchOutOfRange { pitch: i32 },
}

// Re-export main types
pub use chords::{
    build_chord, parse_chord, parse_numeral, Chord, ChordQuality, ChordSymbol, MusicalDefault,
    ParsedChord,
};
pub use space::{
    build_scale, fit_register, resolve_pitch, Accidental, Key, Letter, Mode, PitchClass,
    ScaleTable,
};
