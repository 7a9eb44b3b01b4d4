// Phrase Library - Authored melodic lines for lead and horn roles
// Notes are scale degrees or chord-tone indices, so every phrase transposes with the key

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ConfigurationError;

const END_EPSILON: f64 = 1e-9;

/// What a phrase note's degree is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseAnchor {
    /// 1-based degree of the arrangement key's scale
    Scale,

    /// 1-based index into the bar chord's tones (past the top wraps up an octave)
    ChordTones,
}

/// One note of an authored phrase, positioned within its bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhraseNote {
    pub degree: i32,
    pub octave: i8,

    /// Beats from the start of the bar
    pub offset: f64,

    pub duration: f64,

    /// Literal velocity, clamped to the instrument range on output
    pub velocity: u8,
}

fn n(degree: i32, octave: i8, offset: f64, duration: f64, velocity: u8) -> PhraseNote {
    PhraseNote {
        degree,
        octave,
        offset,
        duration,
        velocity,
    }
}

/// A cycle of bar phrases with an optional closing bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseSet {
    pub id: String,
    pub name: String,
    pub beats_per_bar: f64,
    pub anchor: PhraseAnchor,

    /// Bar phrases played in turn through a section
    pub bars: Vec<Vec<PhraseNote>>,

    /// Played instead on the last bar of a section
    pub cadence: Option<Vec<PhraseNote>>,
}

impl PhraseSet {
    /// Notes for the `index`-th bar (0-based) of a section
    pub fn bar(&self, index: u32, is_last_bar: bool) -> &[PhraseNote] {
        if is_last_bar {
            if let Some(cadence) = &self.cadence {
                return cadence;
            }
        }
        &self.bars[index as usize % self.bars.len()]
    }

    /// Check the phrase invariants
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fail = |reason: String| ConfigurationError::InvalidPhraseSet {
            set: self.id.clone(),
            reason,
        };

        if self.bars.is_empty() {
            return Err(fail("no bar phrases".to_string()));
        }

        let all_bars = self.bars.iter().chain(self.cadence.iter());
        for (b, notes) in all_bars.enumerate() {
            for (i, note) in notes.iter().enumerate() {
                if note.offset < 0.0 || note.duration <= 0.0 {
                    return Err(fail(format!("bar {} note {} has bad timing", b, i)));
                }
                if note.offset + note.duration > self.beats_per_bar + END_EPSILON {
                    return Err(fail(format!("bar {} note {} runs past the bar", b, i)));
                }
                if note.velocity == 0 || note.velocity > 127 {
                    return Err(fail(format!("bar {} note {} velocity {}", b, i, note.velocity)));
                }
                if self.anchor == PhraseAnchor::ChordTones && note.degree < 1 {
                    return Err(fail(format!("bar {} note {} chord tone {}", b, i, note.degree)));
                }
            }

            if let Some(i) = notes.windows(2).position(|w| w[1].offset <= w[0].offset) {
                return Err(fail(format!("bar {} note {} does not move forward", b, i + 1)));
            }
        }

        Ok(())
    }
}

/// Read-only registry of phrase sets
#[derive(Debug, Clone, Default)]
pub struct PhraseLibrary {
    sets: BTreeMap<String, Arc<PhraseSet>>,
}

impl PhraseLibrary {
    pub fn from_sets(sets: Vec<PhraseSet>) -> Result<Self, ConfigurationError> {
        let mut library = PhraseLibrary::default();
        for set in sets {
            set.validate()?;
            library.sets.insert(set.id.clone(), Arc::new(set));
        }
        Ok(library)
    }

    pub fn get(&self, id: &str) -> Result<Arc<PhraseSet>, ConfigurationError> {
        self.sets
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownPhraseSet(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.sets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The built-in phrase sets
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_sets(vec![
            requinto_bolero(),
            requinto_verse(),
            requinto_solo(),
            requinto_resolution(),
            trombone_mambo(),
            saxo_mambo(),
        ])
    }
}

fn set(
    id: &str,
    name: &str,
    beats_per_bar: f64,
    anchor: PhraseAnchor,
    bars: Vec<Vec<PhraseNote>>,
    cadence: Option<Vec<PhraseNote>>,
) -> PhraseSet {
    PhraseSet {
        id: id.to_string(),
        name: name.to_string(),
        beats_per_bar,
        anchor,
        bars,
        cadence,
    }
}

// Requinto lines in scale degrees; octave 4 spans tonic..leading tone above middle C.

/// Slow, sung intro lines in bolero style
fn requinto_bolero() -> PhraseSet {
    set(
        "requinto_bolero",
        "Requinto Bolero Intro",
        4.0,
        PhraseAnchor::Scale,
        vec![
            vec![n(5, 4, 0.0, 2.0, 55), n(3, 4, 2.5, 1.5, 55)],
            vec![n(1, 4, 0.0, 2.0, 60), n(2, 4, 2.5, 1.5, 60)],
            vec![n(3, 4, 0.0, 1.0, 65), n(4, 4, 1.0, 1.0, 65), n(5, 4, 2.0, 2.0, 65)],
        ],
        Some(vec![
            n(4, 4, 0.0, 0.75, 70),
            n(3, 4, 0.75, 0.75, 70),
            n(2, 4, 1.5, 0.75, 70),
            n(1, 4, 2.25, 1.75, 70),
        ]),
    )
}

/// Verse fills answering the vocal, climbing into the solo
fn requinto_verse() -> PhraseSet {
    set(
        "requinto_verse",
        "Requinto Verse Fills",
        4.0,
        PhraseAnchor::Scale,
        vec![
            vec![
                n(1, 4, 0.0, 0.5, 72),
                n(3, 4, 0.5, 0.5, 74),
                n(5, 4, 1.0, 1.0, 76),
                n(4, 4, 2.5, 0.5, 74),
                n(3, 4, 3.0, 0.5, 72),
            ],
            vec![
                n(2, 4, 0.0, 0.5, 74),
                n(1, 4, 0.5, 1.5, 76),
                n(3, 4, 2.5, 0.5, 74),
                n(4, 4, 3.0, 0.5, 76),
            ],
            vec![
                n(5, 4, 0.0, 1.0, 78),
                n(6, 4, 1.0, 0.5, 76),
                n(5, 4, 1.5, 0.5, 78),
                n(4, 4, 2.0, 0.5, 76),
                n(3, 4, 2.5, 1.5, 80),
            ],
            vec![
                n(4, 4, 0.0, 0.75, 78),
                n(5, 4, 0.75, 0.75, 80),
                n(6, 4, 1.5, 0.5, 82),
                n(7, 4, 2.0, 0.5, 84),
                n(1, 5, 2.5, 1.5, 86),
            ],
        ],
        Some(vec![
            n(7, 4, 0.0, 0.5, 84),
            n(1, 5, 0.5, 0.5, 86),
            n(2, 5, 1.0, 0.5, 88),
            n(3, 5, 1.5, 0.5, 90),
            n(4, 5, 2.0, 0.5, 88),
            n(3, 5, 2.5, 0.5, 86),
            n(2, 5, 3.0, 0.5, 88),
            n(1, 5, 3.5, 0.5, 90),
        ]),
    )
}

/// Picado solo runs, densest in the middle bars
fn requinto_solo() -> PhraseSet {
    let run_down: Vec<PhraseNote> = [
        (5, 5),
        (6, 5),
        (7, 5),
        (1, 6),
        (7, 5),
        (6, 5),
        (5, 5),
        (4, 5),
        (3, 5),
        (4, 5),
        (5, 5),
        (6, 5),
        (7, 5),
        (1, 6),
        (7, 5),
        (6, 5),
    ]
    .iter()
    .enumerate()
    .map(|(i, &(degree, octave))| {
        n(degree, octave, i as f64 * 0.25, 0.22, 105 + (i * 10 / 16) as u8)
    })
    .collect();

    let run_up: Vec<PhraseNote> = [
        (5, 5),
        (4, 5),
        (3, 5),
        (2, 5),
        (1, 5),
        (7, 4),
        (6, 4),
        (5, 4),
        (6, 4),
        (7, 4),
        (1, 5),
        (2, 5),
        (3, 5),
        (4, 5),
        (5, 5),
        (6, 5),
    ]
    .iter()
    .enumerate()
    .map(|(i, &(degree, octave))| {
        n(degree, octave, i as f64 * 0.25, 0.22, 108 + (i * 7 / 16) as u8)
    })
    .collect();

    set(
        "requinto_solo",
        "Requinto Solo",
        4.0,
        PhraseAnchor::Scale,
        vec![
            vec![
                n(1, 5, 0.0, 0.5, 95),
                n(2, 5, 0.5, 0.25, 92),
                n(3, 5, 0.75, 0.5, 98),
                n(4, 5, 1.25, 0.25, 95),
                n(5, 5, 1.5, 0.75, 100),
                n(4, 5, 2.25, 0.25, 95),
                n(3, 5, 2.5, 0.25, 98),
                n(2, 5, 2.75, 0.25, 95),
                n(1, 5, 3.0, 0.5, 100),
                n(7, 4, 3.5, 0.5, 95),
            ],
            vec![
                n(1, 5, 0.0, 0.25, 98),
                n(3, 5, 0.25, 0.25, 100),
                n(5, 5, 0.5, 0.25, 102),
                n(1, 6, 0.75, 0.5, 105),
                n(7, 5, 1.25, 0.25, 102),
                n(6, 5, 1.5, 0.25, 100),
                n(5, 5, 1.75, 0.25, 102),
                n(4, 5, 2.0, 0.25, 100),
                n(3, 5, 2.25, 0.25, 102),
                n(2, 5, 2.5, 0.25, 100),
                n(1, 5, 2.75, 0.25, 105),
                n(2, 5, 3.0, 0.25, 102),
                n(3, 5, 3.25, 0.25, 105),
                n(4, 5, 3.5, 0.25, 102),
                n(5, 5, 3.75, 0.25, 108),
            ],
            run_down,
            run_up,
        ],
        Some(vec![
            n(7, 5, 0.0, 0.25, 110),
            n(1, 6, 0.25, 0.5, 112),
            n(7, 5, 0.75, 0.25, 108),
            n(6, 5, 1.0, 0.25, 110),
            n(5, 5, 1.25, 0.75, 108),
            n(4, 5, 2.0, 0.5, 105),
            n(3, 5, 2.5, 0.5, 102),
            n(1, 5, 3.0, 1.0, 110),
        ]),
    )
}

/// Descent home, ending on a held tonic
fn requinto_resolution() -> PhraseSet {
    set(
        "requinto_resolution",
        "Requinto Resolution",
        4.0,
        PhraseAnchor::Scale,
        vec![vec![
            n(5, 4, 0.0, 0.5, 100),
            n(3, 4, 0.5, 0.5, 98),
            n(1, 4, 1.0, 1.5, 102),
            n(2, 4, 2.5, 0.5, 95),
            n(3, 4, 3.0, 0.5, 98),
            n(4, 4, 3.5, 0.5, 100),
        ]],
        Some(vec![
            n(5, 4, 0.0, 0.5, 102),
            n(4, 4, 0.5, 0.5, 98),
            n(3, 4, 1.0, 0.5, 100),
            n(2, 4, 1.5, 0.5, 95),
            n(1, 4, 2.0, 2.0, 105),
        ]),
    )
}

/// Trombone mambo figures on the bar chord
fn trombone_mambo() -> PhraseSet {
    set(
        "trombone_mambo",
        "Trombone Mambo",
        4.0,
        PhraseAnchor::ChordTones,
        vec![
            vec![
                n(1, 3, 0.0, 0.5, 100),
                n(3, 3, 0.5, 0.5, 92),
                n(2, 3, 1.5, 0.5, 98),
                n(1, 3, 2.5, 0.5, 94),
                n(4, 3, 3.0, 0.75, 102),
            ],
            vec![
                n(1, 3, 0.0, 0.5, 90),
                n(2, 3, 0.5, 0.5, 92),
                n(3, 3, 1.0, 0.5, 94),
                n(4, 3, 1.5, 0.5, 96),
                n(3, 3, 2.0, 0.5, 94),
                n(2, 3, 2.5, 0.5, 92),
                n(1, 3, 3.0, 1.0, 98),
            ],
        ],
        None,
    )
}

/// Merengue sax jaleo in 2/4 bars
fn saxo_mambo() -> PhraseSet {
    set(
        "saxo_mambo",
        "Saxophone Mambo",
        2.0,
        PhraseAnchor::ChordTones,
        vec![
            vec![
                n(1, 4, 0.0, 0.3, 95),
                n(3, 4, 0.5, 0.3, 90),
                n(2, 4, 1.0, 0.3, 92),
                n(1, 4, 1.5, 0.3, 88),
            ],
            vec![
                n(1, 4, 0.0, 0.4, 85),
                n(2, 4, 0.5, 0.4, 88),
                n(3, 4, 1.0, 0.4, 91),
                n(4, 4, 1.5, 0.4, 94),
            ],
        ],
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_phrases_validate() {
        let library = PhraseLibrary::builtin().unwrap();
        assert_eq!(library.len(), 6);
        assert!(library.get("requinto_solo").is_ok());
    }

    #[test]
    fn test_unknown_phrase_set_fails() {
        let library = PhraseLibrary::builtin().unwrap();
        assert_eq!(
            library.get("cumbia_accordion").unwrap_err(),
            ConfigurationError::UnknownPhraseSet("cumbia_accordion".to_string())
        );
    }

    #[test]
    fn test_cadence_only_on_last_bar() {
        let verse = requinto_verse();
        assert_eq!(verse.bar(0, false)[0].degree, 1);
        assert_eq!(verse.bar(4, false), verse.bar(0, false));
        assert_eq!(verse.bar(4, true)[0].degree, 7);
    }

    #[test]
    fn test_resolution_ends_on_held_tonic() {
        let resolution = requinto_resolution();
        let last = resolution.bar(1, true).last().copied().unwrap();
        assert_eq!(last.degree, 1);
        assert_eq!(last.offset + last.duration, 4.0);
    }

    #[test]
    fn test_solo_runs_build_velocity() {
        let solo = requinto_solo();
        let run = solo.bar(2, false);
        assert_eq!(run.len(), 16);
        assert_eq!(run[0].velocity, 105);
        assert_eq!(run[15].velocity, 114);
        assert!(run.windows(2).all(|w| w[0].velocity <= w[1].velocity));
    }

    #[test]
    fn test_simultaneous_notes_rejected() {
        let bad = set(
            "bad",
            "Bad",
            4.0,
            PhraseAnchor::Scale,
            vec![vec![n(1, 4, 1.0, 0.5, 80), n(3, 4, 1.0, 0.5, 80)]],
            None,
        );
        assert!(matches!(
            PhraseLibrary::from_sets(vec![bad]),
            Err(ConfigurationError::InvalidPhraseSet { .. })
        ));
    }

    #[test]
    fn test_note_past_bar_rejected() {
        let bad = set(
            "bad",
            "Bad",
            2.0,
            PhraseAnchor::Scale,
            vec![vec![n(1, 4, 1.5, 1.0, 80)]],
            None,
        );
        assert!(bad.validate().is_err());
    }
}
