// Merengue
// Tambora-led merengue típico in 2/4 with fast güira and sax jaleo

use super::types::*;
use crate::arranger::section::SectionKind;
use crate::groove::TimeSignature;
use crate::pitch::Mode;

/// Create the merengue genre spec
///
/// Characteristics:
/// - 2/4, galopante feel, 140-180 BPM
/// - Tambora gallop and bass walk over two-bar cycles
/// - Güira enters after the intro
/// - Progression: I - V - vi - IV
pub fn merengue_spec() -> GenreSpec {
    GenreSpec {
        genre: Genre::Merengue,
        display_name: "Merengue Típico",
        tempo_range: (140, 180),
        time_signature: TimeSignature::TWO_FOUR,
        swing: SwingClass::Galopante,
        clave: None,
        default_mode: Mode::Major,
        patterns: vec![
            ("tambora", "tambora_gallop"),
            ("guira", "guira_merengue_fast"),
            ("bass", "merengue_bass"),
            ("piano", "piano_guajeo"),
        ],
        roles: vec![
            RoleSpec {
                role: Role::Lead,
                instrument: "saxo_section",
                part: PartSpec::Phrases("saxo_mambo"),
            },
            RoleSpec {
                role: Role::Keys,
                instrument: "piano_merengue",
                part: PartSpec::Pattern {
                    pattern_role: "piano",
                    voicing: Voicing::Chord {
                        octave: 4,
                        max_tones: 3,
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion1,
                instrument: "tambora",
                part: PartSpec::Pattern {
                    pattern_role: "tambora",
                    // Open, muted, rim, muted
                    voicing: Voicing::Percussion {
                        keys: vec![41, 43, 37, 43],
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion2,
                instrument: "guira_merengue",
                part: PartSpec::Pattern {
                    pattern_role: "guira",
                    voicing: Voicing::Percussion { keys: vec![69, 70] },
                },
            },
            RoleSpec {
                role: Role::Bass,
                instrument: "bajo_bachata",
                part: PartSpec::Pattern {
                    pattern_role: "bass",
                    voicing: Voicing::ChordToneCycle {
                        octave: 2,
                        tones: vec![0, 0, 1, 2],
                    },
                },
            },
        ],
        overrides: vec![OverrideSpec {
            role: Role::Percussion2,
            section: SectionKind::Intro,
            part: PartSpec::Silent,
        }],
        progression: vec!["I", "V", "vi", "IV"],
        frequency_profile: vec![
            ("tambora", (60, 500)),
            ("guira", (6000, 15000)),
            ("saxos", (200, 6000)),
            ("piano", (300, 4000)),
            ("bass", (40, 200)),
        ],
        negative_tags: vec![
            "slow tempo",
            "ballad feel",
            "heavy reverb",
            "rock drums",
            "distorted guitar",
        ],
        style_hint: "Dominican merengue, energetic tambora drum, syncopated rhythms, \
                     party atmosphere",
    }
}
