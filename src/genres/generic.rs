// Generic
// Pop/rock baseline: kit, bass, keys pad and strummed guitar

use super::types::*;
use crate::arranger::section::SectionKind;
use crate::groove::TimeSignature;
use crate::pitch::Mode;

/// Create the generic pop spec
///
/// Characteristics:
/// - 4/4, straight feel, 90-140 BPM
/// - Guitar waits out the intro
/// - Progression: I - V - vi - IV
pub fn generic_spec() -> GenreSpec {
    GenreSpec {
        genre: Genre::Generic,
        display_name: "Pop/Rock Standard",
        tempo_range: (90, 140),
        time_signature: TimeSignature::FOUR_FOUR,
        swing: SwingClass::Straight,
        clave: None,
        default_mode: Mode::Major,
        patterns: vec![
            ("drums", "rock_beat"),
            ("bass", "pop_bass"),
            ("pad", "pad_whole"),
            ("strum", "pop_strum"),
        ],
        roles: vec![
            RoleSpec {
                role: Role::Drums,
                instrument: "drums",
                part: PartSpec::Pattern {
                    pattern_role: "drums",
                    // Kick, hat, snare, hat
                    voicing: Voicing::Percussion {
                        keys: vec![36, 42, 38, 42],
                    },
                },
            },
            RoleSpec {
                role: Role::Bass,
                instrument: "electric_bass",
                part: PartSpec::Pattern {
                    pattern_role: "bass",
                    voicing: Voicing::ChordToneCycle {
                        octave: 2,
                        tones: vec![0, 0, 2, 0, 2, 1],
                    },
                },
            },
            RoleSpec {
                role: Role::Keys,
                instrument: "keyboards",
                part: PartSpec::Pattern {
                    pattern_role: "pad",
                    voicing: Voicing::Chord {
                        octave: 4,
                        max_tones: 4,
                    },
                },
            },
            RoleSpec {
                role: Role::Guitar,
                instrument: "electric_guitar",
                part: PartSpec::Pattern {
                    pattern_role: "strum",
                    voicing: Voicing::Chord {
                        octave: 3,
                        max_tones: 3,
                    },
                },
            },
        ],
        overrides: vec![OverrideSpec {
            role: Role::Guitar,
            section: SectionKind::Intro,
            part: PartSpec::Silent,
        }],
        progression: vec!["I", "V", "vi", "IV"],
        frequency_profile: vec![
            ("drums", (40, 12000)),
            ("bass", (40, 400)),
            ("keys", (100, 8000)),
            ("guitar", (200, 6000)),
        ],
        negative_tags: vec![
            "lo-fi",
            "amateur recording",
            "thin sound",
            "harsh frequencies",
        ],
        style_hint: "tropical Latin music, Caribbean influence, warm production, \
                     danceable rhythms",
    }
}
