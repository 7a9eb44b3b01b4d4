// Chords - Chord qualities, symbol parsing and root-position voicing
// Roman numerals resolve against a key so progressions transpose with it

use serde::{Deserialize, Serialize};
use std::fmt;

use super::space::{fit_register, Key, PitchClass};
use super::PitchError;
use crate::config::{EngineConfig, PitchPolicy};

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Dominant7,
    Minor7,
    Major7,
    Diminished,
    Augmented,
    Sus2,
    Sus4,
}

impl ChordQuality {
    /// Semitone intervals above the root, root first
    pub fn intervals(&self) -> &'static [i32] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
        }
    }

    /// Recognise a chord-symbol suffix
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "maj" | "M" => Some(ChordQuality::Major),
            "m" | "min" | "-" => Some(ChordQuality::Minor),
            "7" | "dom7" => Some(ChordQuality::Dominant7),
            "m7" | "min7" | "-7" => Some(ChordQuality::Minor7),
            "maj7" | "M7" => Some(ChordQuality::Major7),
            "dim" | "o" => Some(ChordQuality::Diminished),
            "aug" | "+" => Some(ChordQuality::Augmented),
            "sus2" => Some(ChordQuality::Sus2),
            "sus4" | "sus" => Some(ChordQuality::Sus4),
            _ => None,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }
}

/// A musical default applied instead of failing
///
/// Currently only produced when a chord suffix is not recognised and the
/// chord falls back to a major triad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicalDefault {
    /// The symbol as written
    pub symbol: String,

    /// The suffix that was not recognised
    pub unknown_suffix: String,

    /// Quality used instead
    pub applied: ChordQuality,
}

impl fmt::Display for MusicalDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown chord quality '{}' in '{}', using {:?}",
            self.unknown_suffix, self.symbol, self.applied
        )
    }
}

/// Root plus quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChordSymbol {
    pub root: PitchClass,
    pub quality: ChordQuality,
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality.suffix())
    }
}

/// Result of parsing a chord symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChord {
    pub symbol: ChordSymbol,
    pub default_applied: Option<MusicalDefault>,
}

impl ParsedChord {
    fn with_suffix(text: &str, root: PitchClass, suffix: &str, fallback: ChordQuality) -> Self {
        match ChordQuality::from_suffix(suffix) {
            Some(quality) => ParsedChord {
                symbol: ChordSymbol { root, quality },
                default_applied: None,
            },
            None => ParsedChord {
                symbol: ChordSymbol { root, quality: fallback },
                default_applied: Some(MusicalDefault {
                    symbol: text.to_string(),
                    unknown_suffix: suffix.to_string(),
                    applied: fallback,
                }),
            },
        }
    }
}

/// Parse an absolute chord symbol such as "E", "C#m", "B7" or "Bbmaj7"
///
/// An unreadable root is `InvalidChord`; an unrecognised quality falls back
/// to a major triad and reports the default.
pub fn parse_chord(text: &str) -> Result<ParsedChord, PitchError> {
    let trimmed = text.trim();
    let (root, suffix) = PitchClass::parse_prefix(trimmed)
        .ok_or_else(|| PitchError::InvalidChord(trimmed.to_string()))?;

    Ok(ParsedChord::with_suffix(trimmed, root, suffix, ChordQuality::Major))
}

/// Parse a roman-numeral chord ("I", "vi", "V7", "ii7", "viidim") against a key
///
/// Upper case numerals are major-family, lower case minor-family.
pub fn parse_numeral(text: &str, key: &Key) -> Result<ParsedChord, PitchError> {
    let trimmed = text.trim();
    let split = trimmed
        .find(|c: char| !matches!(c, 'I' | 'V' | 'i' | 'v'))
        .unwrap_or(trimmed.len());
    let (numeral, suffix) = trimmed.split_at(split);

    let degree = match numeral.to_ascii_uppercase().as_str() {
        "I" => 1,
        "II" => 2,
        "III" => 3,
        "IV" => 4,
        "V" => 5,
        "VI" => 6,
        "VII" => 7,
        _ => return Err(PitchError::InvalidChord(trimmed.to_string())),
    };

    let upper = numeral.chars().all(|c| c.is_ascii_uppercase());
    let lower = numeral.chars().all(|c| c.is_ascii_lowercase());
    if !upper && !lower {
        return Err(PitchError::InvalidChord(trimmed.to_string()));
    }

    let root = key.degree_class(degree);
    let parsed = match (suffix, lower) {
        ("", false) => ParsedChord::with_suffix(trimmed, root, "", ChordQuality::Major),
        ("", true) => ParsedChord::with_suffix(trimmed, root, "m", ChordQuality::Major),
        ("7", true) => ParsedChord::with_suffix(trimmed, root, "m7", ChordQuality::Major),
        _ => ParsedChord::with_suffix(trimmed, root, suffix, ChordQuality::Major),
    };

    Ok(parsed)
}

/// A voiced chord, root always lowest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub symbol: ChordSymbol,
    pub pitches: Vec<u8>,
}

impl Chord {
    pub fn root(&self) -> u8 {
        self.pitches[0]
    }

    /// Chord tone by index, continuing into higher octaves past the last tone
    pub fn tone(&self, index: usize) -> i32 {
        let len = self.pitches.len();
        self.pitches[index % len] as i32 + 12 * (index / len) as i32
    }
}

/// Build a root-position chord in the given reference octave
pub fn build_chord(
    symbol: ChordSymbol,
    octave: i8,
    config: &EngineConfig,
) -> Result<Chord, PitchError> {
    let root = symbol.root.pitch(octave as i32);
    let raw: Vec<i32> = symbol
        .quality
        .intervals()
        .iter()
        .map(|interval| root + interval)
        .collect();

    let pitches = fit_voicing(&raw, config)?;
    Ok(Chord { symbol, pitches })
}

/// Move a whole voicing by octaves so every tone fits the register
///
/// Shifting the chord as a unit keeps the root at the bottom.
fn fit_voicing(raw: &[i32], config: &EngineConfig) -> Result<Vec<u8>, PitchError> {
    let (lo, hi) = (config.lowest_pitch(), config.highest_pitch());
    let lowest = raw.iter().copied().min().unwrap_or(lo);
    let highest = raw.iter().copied().max().unwrap_or(lo);

    let mut shift = 0;
    if lowest < lo || highest > hi {
        if config.pitch_policy == PitchPolicy::Reject {
            let pitch = if lowest < lo { lowest } else { highest };
            return Err(PitchError::PitchOutOfRange { pitch });
        }
        while lowest + shift < lo {
            shift += 12;
        }
        while highest + shift > hi {
            shift -= 12;
        }
    }

    raw.iter().map(|pitch| fit_register(pitch + shift, config)).collect()
}
