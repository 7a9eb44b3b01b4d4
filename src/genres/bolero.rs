// Bolero
// Slow romantic ballad: sung requinto lines over a bolero strum and strings

use super::types::*;
use crate::arranger::section::SectionKind;
use crate::groove::TimeSignature;
use crate::pitch::Mode;

/// Create the bolero genre spec
///
/// Characteristics:
/// - 4/4, straight feel, 70-90 BPM
/// - Requinto carries the melody throughout
/// - Strings hold the harmony as a sustained pad
/// - Progression: I - vi - ii7 - V7
pub fn bolero_spec() -> GenreSpec {
    GenreSpec {
        genre: Genre::Bolero,
        display_name: "Bolero Clásico",
        tempo_range: (70, 90),
        time_signature: TimeSignature::FOUR_FOUR,
        swing: SwingClass::Straight,
        clave: None,
        default_mode: Mode::Major,
        patterns: vec![
            ("strum", "bolero_strum"),
            ("bongo", "bolero_bongo"),
            ("bass", "bolero_bass"),
            ("pad", "pad_whole"),
        ],
        roles: vec![
            RoleSpec {
                role: Role::Lead,
                instrument: "requinto",
                part: PartSpec::Phrases("requinto_bolero"),
            },
            RoleSpec {
                role: Role::Rhythm,
                instrument: "segunda_guitarra",
                part: PartSpec::Pattern {
                    pattern_role: "strum",
                    voicing: Voicing::Chord {
                        octave: 3,
                        max_tones: 4,
                    },
                },
            },
            RoleSpec {
                role: Role::Keys,
                instrument: "strings",
                part: PartSpec::Pattern {
                    pattern_role: "pad",
                    voicing: Voicing::Chord {
                        octave: 4,
                        max_tones: 4,
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion1,
                instrument: "bongo",
                part: PartSpec::Pattern {
                    pattern_role: "bongo",
                    voicing: Voicing::Percussion {
                        keys: vec![61, 60, 60, 61, 60],
                    },
                },
            },
            RoleSpec {
                role: Role::Bass,
                instrument: "bajo_bachata",
                part: PartSpec::Pattern {
                    pattern_role: "bass",
                    voicing: Voicing::ChordToneCycle {
                        octave: 2,
                        tones: vec![0, 2],
                    },
                },
            },
        ],
        overrides: vec![
            OverrideSpec {
                role: Role::Percussion1,
                section: SectionKind::Intro,
                part: PartSpec::Silent,
            },
            OverrideSpec {
                role: Role::Lead,
                section: SectionKind::Resolution,
                part: PartSpec::Phrases("requinto_resolution"),
            },
            OverrideSpec {
                role: Role::Rhythm,
                section: SectionKind::Solo,
                part: PartSpec::Sparse {
                    octave: 3,
                    velocity_scale: 0.6,
                },
            },
        ],
        progression: vec!["I", "vi", "ii7", "V7"],
        frequency_profile: vec![
            ("requinto", (2000, 5000)),
            ("segunda", (200, 2000)),
            ("strings", (200, 6000)),
            ("bass", (60, 250)),
        ],
        negative_tags: vec![
            "fast tempo",
            "electronic beats",
            "distorted guitar",
            "trap",
            "heavy drums",
        ],
        style_hint: "latin bolero, slow romantic ballad, expressive acoustic guitar, \
                     emotional strings, Cuban influence",
    }
}
