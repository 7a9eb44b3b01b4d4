// Genre Type Definitions
// A genre is a binding of roles to instruments and parts, not a preset sound

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::arranger::section::SectionKind;
use crate::catalog::{InstrumentProfile, PhraseSet, RhythmPattern};
use crate::groove::TimeSignature;
use crate::pitch::{Key, Mode, PitchClass};

/// Supported genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Bachata,
    Bolero,
    Salsa,
    Merengue,
    Generic,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Bachata,
        Genre::Bolero,
        Genre::Salsa,
        Genre::Merengue,
        Genre::Generic,
    ];

    /// Lookup id used by callers (e.g., "bachata")
    pub fn id(&self) -> &'static str {
        match self {
            Genre::Bachata => "bachata",
            Genre::Bolero => "bolero",
            Genre::Salsa => "salsa",
            Genre::Merengue => "merengue",
            Genre::Generic => "generic",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Genre::ALL
            .iter()
            .copied()
            .find(|g| g.id() == id.trim().to_lowercase())
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Musical function of a track within an arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Lead,
    Rhythm,
    Keys,
    Bass,
    Percussion1,
    Percussion2,
    Brass,
    Clave,
    Drums,
    Guitar,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Lead => "lead",
            Role::Rhythm => "rhythm",
            Role::Keys => "keys",
            Role::Bass => "bass",
            Role::Percussion1 => "percussion1",
            Role::Percussion2 => "percussion2",
            Role::Brass => "brass",
            Role::Clave => "clave",
            Role::Drums => "drums",
            Role::Guitar => "guitar",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rhythmic feel of a genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingClass {
    Straight,
    Syncopated,
    Galopante,
}

impl SwingClass {
    pub fn name(&self) -> &'static str {
        match self {
            SwingClass::Straight => "straight",
            SwingClass::Syncopated => "syncopated",
            SwingClass::Galopante => "galopante",
        }
    }
}

/// Which side of the clave comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaveOrientation {
    TwoThree,
    ThreeTwo,
}

impl ClaveOrientation {
    pub fn label(&self) -> &'static str {
        match self {
            ClaveOrientation::TwoThree => "2-3",
            ClaveOrientation::ThreeTwo => "3-2",
        }
    }

    /// Pattern library id of the clave in this orientation
    pub fn pattern_id(&self) -> &'static str {
        match self {
            ClaveOrientation::TwoThree => "clave_2_3",
            ClaveOrientation::ThreeTwo => "clave_3_2",
        }
    }
}

/// Pattern role a clave genre binds its clave pattern to
pub const CLAVE_PATTERN_ROLE: &str = "clave";

/// How pattern onsets turn into pitches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Voicing {
    /// Every chord tone on every onset, capped at `max_tones`
    Chord { octave: i8, max_tones: usize },

    /// One chord tone per onset, cycling through `tones` (0 = root)
    ChordToneCycle { octave: i8, tones: Vec<usize> },

    /// Fixed percussion keys, cycling per onset
    Percussion { keys: Vec<u8> },
}

/// Part as authored: references catalog entries by id
#[derive(Debug, Clone, PartialEq)]
pub enum PartSpec {
    Pattern {
        pattern_role: &'static str,
        voicing: Voicing,
    },
    Phrases(&'static str),
    Sparse { octave: i8, velocity_scale: f64 },
    Silent,
}

/// Role binding as authored
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSpec {
    pub role: Role,
    pub instrument: &'static str,
    pub part: PartSpec,
}

/// Per-(role, section) replacement part as authored
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideSpec {
    pub role: Role,
    pub section: SectionKind,
    pub part: PartSpec,
}

/// Genre bundle as authored, before catalog lookup
#[derive(Debug, Clone, PartialEq)]
pub struct GenreSpec {
    pub genre: Genre,
    pub display_name: &'static str,
    pub tempo_range: (u32, u32),
    pub time_signature: TimeSignature,
    pub swing: SwingClass,
    pub clave: Option<ClaveOrientation>,

    /// Mode the progression numerals are written for
    pub default_mode: Mode,

    /// Pattern role -> pattern library id
    pub patterns: Vec<(&'static str, &'static str)>,

    /// Roles in output order
    pub roles: Vec<RoleSpec>,

    pub overrides: Vec<OverrideSpec>,

    /// Roman numerals, resolved on the request root in `default_mode`
    pub progression: Vec<&'static str>,

    pub frequency_profile: Vec<(&'static str, (u32, u32))>,
    pub negative_tags: Vec<&'static str>,

    /// Style description handed to the audio renderer
    pub style_hint: &'static str,
}

/// What a role plays in one bar
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Pattern {
        pattern: Arc<RhythmPattern>,
        voicing: Voicing,
    },
    Phrases(Arc<PhraseSet>),

    /// One chord root per bar, held for the whole bar
    Sparse { octave: i8, velocity_scale: f64 },

    Silent,
}

/// A role resolved against the catalogs
#[derive(Debug, Clone, PartialEq)]
pub struct RoleBinding {
    pub role: Role,
    pub profile: Arc<InstrumentProfile>,
    pub part: Part,
}

/// Fully resolved, read-only genre configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GenreConfig {
    pub genre: Genre,
    pub display_name: String,
    pub tempo_range: (u32, u32),
    pub time_signature: TimeSignature,
    pub swing: SwingClass,
    pub clave: Option<ClaveOrientation>,
    pub default_mode: Mode,
    pub roles: Vec<RoleBinding>,
    pub patterns: BTreeMap<String, Arc<RhythmPattern>>,
    pub overrides: BTreeMap<(Role, SectionKind), Part>,
    pub progression: Vec<String>,
    pub frequency_profile: BTreeMap<String, (u32, u32)>,
    pub negative_tags: Vec<String>,
    pub style_hint: String,
}

impl GenreConfig {
    /// Part a role plays in a section: the override if one exists, else its default
    pub fn part_for<'a>(&'a self, binding: &'a RoleBinding, section: SectionKind) -> &'a Part {
        self.overrides
            .get(&(binding.role, section))
            .unwrap_or(&binding.part)
    }

    pub fn binding(&self, role: Role) -> Option<&RoleBinding> {
        self.roles.iter().find(|b| b.role == role)
    }

    /// Integer midpoint of the default tempo range
    pub fn default_tempo(&self) -> u32 {
        let (lo, hi) = self.tempo_range;
        (lo + hi) / 2
    }

    pub fn beats_per_bar(&self) -> f64 {
        self.time_signature.beats_per_bar()
    }

    /// Key on `root` in the genre's default mode
    pub fn key_for(&self, root: PitchClass) -> Key {
        Key::new(root, self.default_mode)
    }

    /// Role -> instrument profile
    pub fn instruments(&self) -> BTreeMap<Role, Arc<InstrumentProfile>> {
        self.roles
            .iter()
            .map(|b| (b.role, Arc::clone(&b.profile)))
            .collect()
    }
}
