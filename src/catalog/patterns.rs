// Rhythm Patterns - Onset cycles that define each genre's groove
// A pattern covers one or two bars; genres bind them to pattern roles

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ConfigurationError;
use crate::groove::Subdivision;

/// A single hit in a pattern cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Onset {
    /// Position in beats from the start of the cycle
    pub offset: f64,

    /// Length in beats
    pub duration: f64,

    /// Added to the section velocity target before clamping
    pub velocity_delta: i8,
}

impl Onset {
    pub fn new(offset: f64, duration: f64, velocity_delta: i8) -> Self {
        Onset {
            offset,
            duration,
            velocity_delta,
        }
    }
}

/// A named, repeating rhythmic cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmPattern {
    /// Library id (e.g., "bachata_derecho")
    pub id: String,

    /// Display name
    pub name: String,

    /// Bar length this pattern is written for
    pub beats_per_bar: f64,

    /// Grid the onsets sit on (used for swing)
    pub subdivision: Subdivision,

    /// Number of bars before the cycle repeats (1 or 2)
    pub cycle_bars: u32,

    /// Onsets in non-decreasing offset order
    pub onsets: Vec<Onset>,

    /// Fraction of a subdivision odd onsets are delayed by, in [0, 1)
    pub swing_amount: f64,
}

impl RhythmPattern {
    /// Total cycle length in beats
    pub fn cycle_beats(&self) -> f64 {
        self.beats_per_bar * self.cycle_bars as f64
    }

    /// Indices of onsets that fall inside the given bar of the cycle
    pub fn onsets_in_bar(&self, cycle_bar: u32) -> impl Iterator<Item = (usize, &Onset)> {
        let window_start = cycle_bar as f64 * self.beats_per_bar;
        let window_end = window_start + self.beats_per_bar;
        self.onsets
            .iter()
            .enumerate()
            .filter(move |(_, o)| o.offset >= window_start && o.offset < window_end)
    }

    /// Check the pattern invariants
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fail = |reason: String| ConfigurationError::InvalidPattern {
            pattern: self.id.clone(),
            reason,
        };

        if self.beats_per_bar <= 0.0 {
            return Err(fail("beats per bar must be positive".to_string()));
        }
        if !(1..=2).contains(&self.cycle_bars) {
            return Err(fail(format!("cycle of {} bars", self.cycle_bars)));
        }
        if self.onsets.is_empty() {
            return Err(fail("no onsets".to_string()));
        }
        if !(0.0..1.0).contains(&self.swing_amount) {
            return Err(fail(format!("swing amount {} outside [0, 1)", self.swing_amount)));
        }

        let cycle = self.cycle_beats();
        for (i, onset) in self.onsets.iter().enumerate() {
            if onset.offset < 0.0 || onset.offset >= cycle {
                return Err(fail(format!(
                    "onset {} at {} outside the {}-beat cycle",
                    i, onset.offset, cycle
                )));
            }
            if onset.duration <= 0.0 {
                return Err(fail(format!("onset {} has non-positive duration", i)));
            }
        }

        if let Some(i) = self
            .onsets
            .windows(2)
            .position(|w| w[1].offset < w[0].offset)
        {
            return Err(fail(format!("onset {} is out of order", i + 1)));
        }

        Ok(())
    }
}

fn pattern(
    id: &str,
    name: &str,
    beats_per_bar: f64,
    subdivision: Subdivision,
    cycle_bars: u32,
    onsets: Vec<Onset>,
    swing_amount: f64,
) -> RhythmPattern {
    RhythmPattern {
        id: id.to_string(),
        name: name.to_string(),
        beats_per_bar,
        subdivision,
        cycle_bars,
        onsets,
        swing_amount,
    }
}

/// Evenly spaced onsets with alternating accents
fn even(count: usize, step: f64, duration: f64, strong: i8, weak: i8) -> Vec<Onset> {
    (0..count)
        .map(|i| {
            let delta = if i % 2 == 0 { strong } else { weak };
            Onset::new(i as f64 * step, duration, delta)
        })
        .collect()
}

/// Read-only registry of rhythm patterns
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: BTreeMap<String, Arc<RhythmPattern>>,
}

impl PatternLibrary {
    /// Build a library, validating every pattern
    pub fn from_patterns(patterns: Vec<RhythmPattern>) -> Result<Self, ConfigurationError> {
        let mut library = PatternLibrary::default();
        for p in patterns {
            p.validate()?;
            library.patterns.insert(p.id.clone(), Arc::new(p));
        }
        Ok(library)
    }

    /// Look up a pattern by id
    pub fn get(&self, id: &str) -> Result<Arc<RhythmPattern>, ConfigurationError> {
        self.patterns
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownPattern(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The built-in pattern set
    pub fn builtin() -> Result<Self, ConfigurationError> {
        use Subdivision::{Eighth, Sixteenth};

        Self::from_patterns(vec![
            // === Bachata ===
            pattern(
                "bachata_derecho",
                "Bachata Derecho",
                4.0,
                Sixteenth,
                1,
                vec![
                    Onset::new(0.0, 0.5, 10),
                    Onset::new(0.5, 0.25, -10),
                    Onset::new(0.75, 0.25, -5),
                    Onset::new(1.0, 0.5, 5),
                    Onset::new(1.5, 0.25, -10),
                    Onset::new(1.75, 0.25, -5),
                    Onset::new(2.0, 0.5, 10),
                    Onset::new(2.5, 0.25, -10),
                    Onset::new(2.75, 0.25, -5),
                    Onset::new(3.0, 0.5, 5),
                    Onset::new(3.5, 0.25, -10),
                    Onset::new(3.75, 0.25, -5),
                ],
                0.0,
            ),
            pattern(
                "bongo_martillo",
                "Bongo Martillo",
                4.0,
                Sixteenth,
                1,
                (0..4)
                    .flat_map(|beat| {
                        let b = beat as f64;
                        [
                            Onset::new(b, 0.2, 15),
                            Onset::new(b + 0.25, 0.15, -15),
                            Onset::new(b + 0.5, 0.15, -5),
                            Onset::new(b + 0.75, 0.15, -10),
                        ]
                    })
                    .collect(),
                0.0,
            ),
            // Low on the beat, high on the "and"
            pattern(
                "bongo_soft",
                "Bongo Soft Entry",
                4.0,
                Eighth,
                1,
                even(8, 0.5, 0.3, 0, -8),
                0.0,
            ),
            pattern(
                "guira_bachata",
                "Güira Bachata",
                4.0,
                Eighth,
                1,
                even(8, 0.5, 0.2, 5, -5),
                0.0,
            ),
            pattern(
                "guira_bachata_sixteenths",
                "Güira Bachata Sixteenths",
                4.0,
                Sixteenth,
                1,
                even(16, 0.25, 0.15, 5, -10),
                0.0,
            ),
            pattern(
                "bachata_bass",
                "Bachata Bass",
                4.0,
                Eighth,
                1,
                vec![Onset::new(0.0, 0.8, 5), Onset::new(2.0, 0.8, 0)],
                0.0,
            ),
            // === Bolero ===
            pattern(
                "bolero_strum",
                "Bolero Strum",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.0, 1.0, 5),
                    Onset::new(1.0, 0.5, -5),
                    Onset::new(1.5, 0.5, -5),
                    Onset::new(2.0, 1.0, 0),
                    Onset::new(3.0, 1.0, -5),
                ],
                0.0,
            ),
            pattern(
                "bolero_bongo",
                "Bolero Bongo",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.0, 0.5, 0),
                    Onset::new(1.0, 0.5, -5),
                    Onset::new(1.5, 0.5, -10),
                    Onset::new(2.0, 0.5, 5),
                    Onset::new(3.0, 0.5, -5),
                ],
                0.0,
            ),
            pattern(
                "bolero_bass",
                "Bolero Bass",
                4.0,
                Eighth,
                1,
                vec![Onset::new(0.0, 1.8, 5), Onset::new(2.0, 1.8, 0)],
                0.0,
            ),
            pattern(
                "pad_whole",
                "Sustained Pad",
                4.0,
                Eighth,
                1,
                vec![Onset::new(0.0, 4.0, -15)],
                0.0,
            ),
            // === Salsa ===
            pattern(
                "clave_2_3",
                "Clave 2-3",
                4.0,
                Eighth,
                2,
                vec![
                    Onset::new(1.0, 0.25, 10),
                    Onset::new(2.0, 0.25, 10),
                    Onset::new(4.0, 0.25, 10),
                    Onset::new(5.5, 0.25, 5),
                    Onset::new(7.0, 0.25, 10),
                ],
                0.1,
            ),
            pattern(
                "clave_3_2",
                "Clave 3-2",
                4.0,
                Eighth,
                2,
                vec![
                    Onset::new(0.0, 0.25, 10),
                    Onset::new(1.5, 0.25, 5),
                    Onset::new(3.0, 0.25, 10),
                    Onset::new(5.0, 0.25, 10),
                    Onset::new(6.0, 0.25, 10),
                ],
                0.1,
            ),
            pattern(
                "tumbao_bass",
                "Tumbao Bass",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.5, 0.5, 10),
                    Onset::new(2.0, 0.5, 5),
                    Onset::new(3.5, 0.5, 10),
                ],
                0.15,
            ),
            pattern(
                "montuno_piano",
                "Piano Montuno",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.0, 0.25, 5),
                    Onset::new(0.5, 0.25, 10),
                    Onset::new(1.0, 0.25, 0),
                    Onset::new(1.5, 0.25, 5),
                    Onset::new(2.0, 0.25, 10),
                    Onset::new(2.5, 0.25, 0),
                    Onset::new(3.0, 0.25, 5),
                    Onset::new(3.5, 0.25, 10),
                ],
                0.1,
            ),
            pattern(
                "conga_tumbao",
                "Conga Tumbao",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.0, 0.25, 0),
                    Onset::new(0.5, 0.25, -10),
                    Onset::new(1.0, 0.25, 10),
                    Onset::new(1.5, 0.25, -5),
                    Onset::new(2.0, 0.25, 0),
                    Onset::new(2.5, 0.25, -10),
                    Onset::new(3.0, 0.25, 5),
                    Onset::new(3.5, 0.25, 10),
                ],
                0.1,
            ),
            pattern(
                "timbal_campana",
                "Timbal Campana",
                4.0,
                Eighth,
                1,
                even(8, 0.5, 0.2, 5, -5),
                0.1,
            ),
            // === Merengue (2/4) ===
            pattern(
                "tambora_gallop",
                "Tambora Gallop",
                2.0,
                Eighth,
                2,
                vec![
                    Onset::new(0.0, 0.25, 15),
                    Onset::new(0.5, 0.25, -5),
                    Onset::new(1.0, 0.25, 10),
                    Onset::new(1.5, 0.25, -5),
                    Onset::new(2.0, 0.25, 15),
                    Onset::new(2.5, 0.25, -5),
                    Onset::new(3.0, 0.25, 10),
                    Onset::new(3.5, 0.25, -5),
                ],
                0.0,
            ),
            pattern(
                "guira_merengue_fast",
                "Güira Merengue Fast",
                2.0,
                Sixteenth,
                1,
                even(8, 0.25, 0.2, 5, -5),
                0.0,
            ),
            pattern(
                "merengue_bass",
                "Merengue Bass",
                2.0,
                Eighth,
                2,
                vec![
                    Onset::new(0.0, 0.4, 5),
                    Onset::new(1.0, 0.4, 0),
                    Onset::new(2.0, 0.4, -5),
                    Onset::new(3.0, 0.4, 0),
                ],
                0.0,
            ),
            pattern(
                "piano_guajeo",
                "Piano Guajeo",
                2.0,
                Eighth,
                1,
                even(4, 0.5, 0.3, 5, -5),
                0.0,
            ),
            // === Generic ===
            pattern(
                "rock_beat",
                "Rock Beat",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.0, 0.5, 15),
                    Onset::new(0.5, 0.25, -10),
                    Onset::new(1.0, 0.5, 20),
                    Onset::new(1.5, 0.25, -10),
                    Onset::new(2.0, 0.5, 15),
                    Onset::new(2.5, 0.25, -10),
                    Onset::new(3.0, 0.5, 20),
                    Onset::new(3.5, 0.25, -10),
                ],
                0.0,
            ),
            pattern(
                "pop_bass",
                "Pop Bass",
                4.0,
                Eighth,
                1,
                vec![
                    Onset::new(0.0, 1.0, 5),
                    Onset::new(1.0, 0.5, 0),
                    Onset::new(1.5, 0.5, -5),
                    Onset::new(2.0, 1.0, 5),
                    Onset::new(3.0, 0.5, 0),
                    Onset::new(3.5, 0.5, -5),
                ],
                0.0,
            ),
            pattern(
                "pop_strum",
                "Pop Strum",
                4.0,
                Eighth,
                1,
                even(4, 1.0, 0.8, 5, -5),
                0.0,
            ),
        ])
    }
}
