// Salsa
// Clave-driven salsa dura: montuno piano, tumbao bass, congas, timbal bell, trombones

use super::types::*;
use crate::arranger::section::SectionKind;
use crate::groove::TimeSignature;
use crate::pitch::Mode;

/// Create the salsa genre spec
///
/// Characteristics:
/// - 4/4, syncopated, 160-220 BPM, 2-3 son clave
/// - Trombones lay out except in choruses and mambos
/// - Progression: i - iv - V7 - i
pub fn salsa_spec() -> GenreSpec {
    GenreSpec {
        genre: Genre::Salsa,
        display_name: "Salsa Dura",
        tempo_range: (160, 220),
        time_signature: TimeSignature::FOUR_FOUR,
        swing: SwingClass::Syncopated,
        clave: Some(ClaveOrientation::TwoThree),
        default_mode: Mode::Minor,
        patterns: vec![
            ("clave", "clave_2_3"),
            ("bass", "tumbao_bass"),
            ("piano", "montuno_piano"),
            ("congas", "conga_tumbao"),
            ("bell", "timbal_campana"),
        ],
        roles: vec![
            RoleSpec {
                role: Role::Lead,
                instrument: "piano_montuno",
                part: PartSpec::Pattern {
                    pattern_role: "piano",
                    voicing: Voicing::Chord {
                        octave: 4,
                        max_tones: 3,
                    },
                },
            },
            RoleSpec {
                role: Role::Bass,
                instrument: "bajo_tumbao",
                part: PartSpec::Pattern {
                    pattern_role: "bass",
                    // Anticipated root, fifth on three, root again
                    voicing: Voicing::ChordToneCycle {
                        octave: 2,
                        tones: vec![0, 2, 0],
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion1,
                instrument: "congas",
                part: PartSpec::Pattern {
                    pattern_role: "congas",
                    // Open high, low, slap
                    voicing: Voicing::Percussion {
                        keys: vec![63, 64, 62, 64, 63, 64, 64, 62],
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion2,
                instrument: "timbal",
                part: PartSpec::Pattern {
                    pattern_role: "bell",
                    voicing: Voicing::Percussion { keys: vec![56] },
                },
            },
            RoleSpec {
                role: Role::Brass,
                instrument: "trombone_section",
                part: PartSpec::Silent,
            },
            RoleSpec {
                role: Role::Clave,
                instrument: "clave",
                part: PartSpec::Pattern {
                    pattern_role: "clave",
                    voicing: Voicing::Percussion { keys: vec![75] },
                },
            },
        ],
        overrides: vec![
            OverrideSpec {
                role: Role::Brass,
                section: SectionKind::Chorus,
                part: PartSpec::Phrases("trombone_mambo"),
            },
            OverrideSpec {
                role: Role::Brass,
                section: SectionKind::Mambo,
                part: PartSpec::Phrases("trombone_mambo"),
            },
            OverrideSpec {
                role: Role::Percussion2,
                section: SectionKind::Intro,
                part: PartSpec::Silent,
            },
        ],
        progression: vec!["i", "iv", "V7", "i"],
        frequency_profile: vec![
            ("piano", (250, 4000)),
            ("bass", (40, 200)),
            ("congas", (150, 3000)),
            ("timbales", (500, 8000)),
            ("trombones", (80, 3000)),
        ],
        negative_tags: vec![
            "rock drums",
            "electric guitar",
            "synthesizer pads",
            "straight rhythms",
            "reverb wash",
            "auto-tune",
        ],
        style_hint: "Cuban salsa, bright brass section, clave rhythm, congas, piano montuno, \
                     son influence, energetic horns",
    }
}
