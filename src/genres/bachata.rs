// Bachata
// Requinto-led romantic bachata: derecho strum, martillo bongo, güira

use super::types::*;
use crate::arranger::section::SectionKind;
use crate::groove::TimeSignature;
use crate::pitch::Mode;

/// Create the bachata genre spec
///
/// Characteristics:
/// - 4/4, straight feel, 115-140 BPM
/// - Requinto plays a bolero intro, verse fills, a picado solo and a resolution
/// - Segunda drops to sparse bass-register roots under the solo
/// - Güira rests during the intro and doubles up in the solo
/// - Progression: I - vi - IV - V7
pub fn bachata_spec() -> GenreSpec {
    GenreSpec {
        genre: Genre::Bachata,
        display_name: "Bachata Romántica",
        tempo_range: (115, 140),
        time_signature: TimeSignature::FOUR_FOUR,
        swing: SwingClass::Straight,
        clave: None,
        default_mode: Mode::Major,
        patterns: vec![
            ("main", "bachata_derecho"),
            ("bolero", "bolero_strum"),
            ("bongo", "bongo_martillo"),
            ("bongo_soft", "bongo_soft"),
            ("guira", "guira_bachata"),
            ("guira_solo", "guira_bachata_sixteenths"),
            ("bass", "bachata_bass"),
        ],
        roles: vec![
            RoleSpec {
                role: Role::Lead,
                instrument: "requinto",
                part: PartSpec::Phrases("requinto_verse"),
            },
            RoleSpec {
                role: Role::Rhythm,
                instrument: "segunda_guitarra",
                part: PartSpec::Pattern {
                    pattern_role: "main",
                    voicing: Voicing::Chord {
                        octave: 3,
                        max_tones: 3,
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion1,
                instrument: "bongo",
                part: PartSpec::Pattern {
                    pattern_role: "bongo",
                    // Low on the beat, high on the subdivisions
                    voicing: Voicing::Percussion {
                        keys: vec![61, 60, 60, 60],
                    },
                },
            },
            RoleSpec {
                role: Role::Percussion2,
                instrument: "guira_bachata",
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
                        tones: vec![0, 0],
                    },
                },
            },
        ],
        overrides: vec![
            OverrideSpec {
                role: Role::Lead,
                section: SectionKind::Intro,
                part: PartSpec::Phrases("requinto_bolero"),
            },
            OverrideSpec {
                role: Role::Lead,
                section: SectionKind::Solo,
                part: PartSpec::Phrases("requinto_solo"),
            },
            OverrideSpec {
                role: Role::Lead,
                section: SectionKind::Resolution,
                part: PartSpec::Phrases("requinto_resolution"),
            },
            OverrideSpec {
                role: Role::Rhythm,
                section: SectionKind::Intro,
                part: PartSpec::Pattern {
                    pattern_role: "bolero",
                    voicing: Voicing::Chord {
                        octave: 3,
                        max_tones: 3,
                    },
                },
            },
            OverrideSpec {
                role: Role::Rhythm,
                section: SectionKind::Solo,
                part: PartSpec::Sparse {
                    octave: 2,
                    velocity_scale: 0.5,
                },
            },
            OverrideSpec {
                role: Role::Percussion1,
                section: SectionKind::Intro,
                part: PartSpec::Pattern {
                    pattern_role: "bongo_soft",
                    voicing: Voicing::Percussion { keys: vec![61, 60] },
                },
            },
            OverrideSpec {
                role: Role::Percussion2,
                section: SectionKind::Intro,
                part: PartSpec::Silent,
            },
            OverrideSpec {
                role: Role::Percussion2,
                section: SectionKind::Solo,
                part: PartSpec::Pattern {
                    pattern_role: "guira_solo",
                    voicing: Voicing::Percussion { keys: vec![69, 70] },
                },
            },
        ],
        progression: vec!["I", "vi", "IV", "V7"],
        frequency_profile: vec![
            ("requinto", (2000, 5000)),
            ("segunda", (200, 400)),
            ("bongo", (200, 800)),
            ("guira", (5000, 10000)),
            ("bass", (60, 250)),
        ],
        negative_tags: vec![
            "drums",
            "electronic beats",
            "distorted guitar",
            "synthesizer",
            "piano",
            "heavy reverb",
            "muddy low end",
            "fast merengue",
            "trap",
        ],
        style_hint: "latin bachata, romantic guitar arpeggios, bongos, güira, sensual bassline, \
                     Dominican style",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bachata_spec() {
        let spec = bachata_spec();
        assert_eq!(spec.genre, Genre::Bachata);
        assert_eq!(spec.roles.len(), 5);
        assert_eq!(spec.progression, vec!["I", "vi", "IV", "V7"]);
        assert!(spec.clave.is_none());
    }
}
