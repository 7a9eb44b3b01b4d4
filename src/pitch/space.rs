// Pitch Space - Letters, accidentals, modes and scale tables
// Pitch numbers follow the MIDI convention (C4 = 60)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::PitchError;
use crate::config::{EngineConfig, PitchPolicy};

/// Note letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Parse a letter (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Semitones above C of the natural note
    pub fn semitone(&self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn index(&self) -> usize {
        Letter::ALL.iter().position(|l| l == self).unwrap_or(0)
    }

    /// The letter `steps` diatonic steps above this one
    pub fn step(&self, steps: usize) -> Letter {
        Letter::ALL[(self.index() + steps) % 7]
    }
}

/// Accidental applied to a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Semitone offset
    pub fn offset(&self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -2 => Some(Accidental::DoubleFlat),
            -1 => Some(Accidental::Flat),
            0 => Some(Accidental::Natural),
            1 => Some(Accidental::Sharp),
            2 => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "##",
        }
    }
}

/// A letter plus accidental, independent of octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PitchClass {
    pub letter: Letter,
    pub accidental: Accidental,
}

impl PitchClass {
    pub fn new(letter: Letter, accidental: Accidental) -> Self {
        PitchClass { letter, accidental }
    }

    pub fn natural(letter: Letter) -> Self {
        PitchClass::new(letter, Accidental::Natural)
    }

    /// Semitone class 0-11
    pub fn semitone(&self) -> i32 {
        (self.letter.semitone() + self.accidental.offset()).rem_euclid(12)
    }

    /// Raw pitch in an octave, without wrapping: Cb4 is 59 and B#3 is 60
    pub fn pitch(&self, octave: i32) -> i32 {
        12 * (octave + 1) + self.letter.semitone() + self.accidental.offset()
    }

    /// Parse a leading pitch class ("C", "F#", "Bb", "Ebb") and return the rest of the text
    pub fn parse_prefix(text: &str) -> Option<(PitchClass, &str)> {
        let mut chars = text.chars();
        let letter = Letter::from_char(chars.next()?)?;
        let rest = &text[1..];

        let (accidental, consumed) = if rest.starts_with("##") {
            (Accidental::DoubleSharp, 2)
        } else if rest.starts_with("bb") {
            (Accidental::DoubleFlat, 2)
        } else if rest.starts_with('#') {
            (Accidental::Sharp, 1)
        } else if rest.starts_with('b') {
            (Accidental::Flat, 1)
        } else {
            (Accidental::Natural, 0)
        };

        Some((PitchClass::new(letter, accidental), &rest[consumed..]))
    }

    /// Spell the note `degree_steps` letters above this one that sounds at `target_semitone`
    pub fn spelled_above(&self, degree_steps: usize, target_semitone: i32) -> PitchClass {
        let letter = self.letter.step(degree_steps);
        let mut diff = (target_semitone - letter.semitone()).rem_euclid(12);
        if diff > 6 {
            diff -= 12;
        }
        match Accidental::from_offset(diff) {
            Some(accidental) => PitchClass::new(letter, accidental),
            None => PitchClass::natural(letter),
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter.as_char(), self.accidental.symbol())
    }
}

/// Resolve a (letter, accidental, octave) triple to an absolute pitch number
///
/// Fails with `InvalidPitch` when the letter is not A-G or the octave is
/// outside the configured bounds.
pub fn resolve_pitch(
    letter: char,
    accidental: Accidental,
    octave: i32,
    config: &EngineConfig,
) -> Result<u8, PitchError> {
    let parsed = Letter::from_char(letter);
    let in_bounds = octave >= config.min_octave as i32 && octave <= config.max_octave as i32;

    match parsed {
        Some(l) if in_bounds => {
            Ok(PitchClass::new(l, accidental).pitch(octave) as u8)
        }
        _ => Err(PitchError::InvalidPitch { letter, octave }),
    }
}

/// Musical modes (7-degree scales)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
    Dorian,
    Mixolydian,
    HarmonicMinor,
}

impl Mode {
    /// Semitone offsets of the seven degrees
    pub fn intervals(&self) -> [i32; 7] {
        match self {
            Mode::Major => [0, 2, 4, 5, 7, 9, 11],
            Mode::Minor => [0, 2, 3, 5, 7, 8, 10],
            Mode::Dorian => [0, 2, 3, 5, 7, 9, 10],
            Mode::Mixolydian => [0, 2, 4, 5, 7, 9, 10],
            Mode::HarmonicMinor => [0, 2, 3, 5, 7, 8, 11],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
            Mode::Dorian => "dorian",
            Mode::Mixolydian => "mixolydian",
            Mode::HarmonicMinor => "harmonic minor",
        }
    }
}

/// A tonal center: root plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub root: PitchClass,
    pub mode: Mode,
}

impl Key {
    pub fn new(root: PitchClass, mode: Mode) -> Self {
        Key { root, mode }
    }

    /// Parse shorthand like "E", "Am", "F#m", "Bb"
    pub fn parse(text: &str) -> Result<Self, PitchError> {
        let trimmed = text.trim();
        let (root, rest) = PitchClass::parse_prefix(trimmed)
            .ok_or_else(|| PitchError::InvalidChord(trimmed.to_string()))?;

        let mode = match rest {
            "" | "maj" | "major" => Mode::Major,
            "m" | "min" | "minor" => Mode::Minor,
            "dorian" => Mode::Dorian,
            "mixolydian" => Mode::Mixolydian,
            _ => return Err(PitchError::InvalidChord(trimmed.to_string())),
        };

        Ok(Key::new(root, mode))
    }

    /// Spelled pitch class of a 1-based scale degree
    pub fn degree_class(&self, degree: usize) -> PitchClass {
        let index = degree.saturating_sub(1) % 7;
        let target = self.root.semitone() + self.mode.intervals()[index];
        self.root.spelled_above(index, target)
    }

    /// Raw pitch of a scale degree relative to `octave`
    ///
    /// Degrees wrap: 8 is the tonic an octave up, 0 is the leading tone below.
    pub fn degree_pitch(&self, degree: i32, octave: i8) -> i32 {
        let index = degree - 1;
        let octave_shift = index.div_euclid(7);
        let step = index.rem_euclid(7) as usize;
        self.root.pitch(octave as i32 + octave_shift) + self.mode.intervals()[step]
    }

    /// Short display name, e.g. "E" or "C#m"
    pub fn short_name(&self) -> String {
        match self.mode {
            Mode::Major => self.root.to_string(),
            Mode::Minor => format!("{}m", self.root),
            other => format!("{} {}", self.root, other.name()),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.mode.name())
    }
}

/// Scale degree lookup table across an octave span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleTable {
    pub key: Key,
    pitches: BTreeMap<(u8, i8), u8>,
}

impl ScaleTable {
    /// Pitch of a 1-based degree in the given octave
    pub fn get(&self, degree: u8, octave: i8) -> Option<u8> {
        self.pitches.get(&(degree, octave)).copied()
    }

    /// All pitches in ascending order
    pub fn ascending(&self) -> Vec<u8> {
        let mut all: Vec<u8> = self.pitches.values().copied().collect();
        all.sort_unstable();
        all
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// Build a (degree, octave) -> pitch table over the configured octave span
pub fn build_scale(root: PitchClass, mode: Mode, config: &EngineConfig) -> ScaleTable {
    let key = Key::new(root, mode);
    let (lo, hi) = config.scale_octaves;
    let mut pitches = BTreeMap::new();

    for octave in lo..=hi {
        for degree in 1..=7u8 {
            let pitch = key.degree_pitch(degree as i32, octave);
            pitches.insert((degree, octave), pitch.clamp(0, 127) as u8);
        }
    }

    ScaleTable { key, pitches }
}

/// Bring a raw pitch into the configured register according to the pitch policy
pub fn fit_register(pitch: i32, config: &EngineConfig) -> Result<u8, PitchError> {
    let (lo, hi) = (config.lowest_pitch(), config.highest_pitch());
    if (lo..=hi).contains(&pitch) {
        return Ok(pitch as u8);
    }

    match config.pitch_policy {
        PitchPolicy::Reject => Err(PitchError::PitchOutOfRange { pitch }),
        PitchPolicy::ClampOctave => {
            let mut fitted = pitch;
            while fitted < lo {
                fitted += 12;
            }
            while fitted > hi {
                fitted -= 12;
            }
            Ok(fitted as u8)
        }
    }
}
