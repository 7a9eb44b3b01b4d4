// Catalog - Instruments, rhythm patterns and phrase sets
// Built once, validated on construction, shared read-only via Arc

pub mod instruments;
pub mod patterns;
pub mod phrases;

use thiserror::Error;

/// Errors raised while building or resolving catalog and genre data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Unknown genre: '{0}'")]
    UnknownGenre(String),

    #[error("Unknown instrument: '{0}'")]
    UnknownInstrument(String),

    #[error("Unknown rhythm pattern: '{0}'")]
    UnknownPattern(String),

    #[error("Unknown phrase set: '{0}'")]
    UnknownPhraseSet(String),

    #[error("Invalid instrument '{instrument}': {reason}")]
    InvalidInstrument { instrument: String, reason: String },

    #[error("Invalid rhythm pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid phrase set '{set}': {reason}")]
    InvalidPhraseSet { set: String, reason: String },

    #[error("Genre '{genre}' has no pattern bound to role '{pattern_role}'")]
    MissingPatternRole { genre: String, pattern_role: String },

    #[error("Genre '{genre}' uses '{item}' written for {found} beats per bar, expected {expected}")]
    MeterMismatch {
        genre: String,
        item: String,
        expected: f64,
        found: f64,
    },

    #[error("Genre '{genre}' declares {orientation} clave but binds pattern '{pattern}'")]
    ClaveMismatch {
        genre: String,
        orientation: String,
        pattern: String,
    },

    #[error("Genre '{genre}' role '{role}': {reason}")]
    InvalidRole {
        genre: String,
        role: String,
        reason: String,
    },
}

// Re-export main types
pub use instruments::{InstrumentCatalog, InstrumentProfile, PERCUSSION_CHANNEL};
pub use patterns::{Onset, PatternLibrary, RhythmPattern};
pub use phrases::{PhraseAnchor, PhraseLibrary, PhraseNote, PhraseSet};
