// Section Structure - Form of an arrangement
// Divides the bars into sections (intro, verse, solo, ...) with velocity targets

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request-level problems caught before any note is generated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Bar count must be positive")]
    NonPositiveBars,

    #[error("Tempo must be positive")]
    NonPositiveTempo,

    #[error("No sections given")]
    NoSections,

    #[error("Section {index} starts at bar {start} after it ends at bar {end}")]
    InvertedSection { index: usize, start: u32, end: u32 },

    #[error("Section {index} reaches bar {bar}, outside bars 1..={bars}")]
    BarOutOfRange { index: usize, bar: u32, bars: u32 },

    #[error("Bar {bar} is not covered by any section")]
    UncoveredBar { bar: u32 },

    #[error("Bar {bar} is covered by more than one section")]
    OverlappingBar { bar: u32 },

    #[error("Chord progression is empty")]
    EmptyProgression,

    #[error("Genre '{0}' has no clave to orient")]
    ClaveNotSupported(String),
}

/// Type of section
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Opening, usually sparse
    Intro,

    /// Main body
    Verse,

    /// Refrain
    Chorus,

    /// Contrasting passage
    Bridge,

    /// Instrumental feature for the lead
    Solo,

    /// Horn-driven climax (salsa/merengue)
    Mambo,

    /// Closing cadence
    Resolution,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Intro,
        SectionKind::Verse,
        SectionKind::Chorus,
        SectionKind::Bridge,
        SectionKind::Solo,
        SectionKind::Mambo,
        SectionKind::Resolution,
    ];

    /// Convert from string representation
    pub fn from_name(s: &str) -> Option<Self> {
        SectionKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s.trim().to_lowercase())
    }

    /// Convert to string representation
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Intro => "intro",
            SectionKind::Verse => "verse",
            SectionKind::Chorus => "chorus",
            SectionKind::Bridge => "bridge",
            SectionKind::Solo => "solo",
            SectionKind::Mambo => "mambo",
            SectionKind::Resolution => "resolution",
        }
    }
}

/// A section of the arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,

    /// First bar (1-based, inclusive)
    pub start: u32,

    /// Last bar (1-based, inclusive)
    pub end: u32,

    /// Velocity target at the first bar
    pub velocity_start: u8,

    /// Velocity target at the last bar
    pub velocity_end: u8,
}

impl Section {
    pub fn new(kind: SectionKind, start: u32, end: u32, velocity_start: u8, velocity_end: u8) -> Self {
        Section {
            kind,
            start,
            end,
            velocity_start,
            velocity_end,
        }
    }

    /// Get the length of this section in bars
    pub fn length_bars(&self) -> u32 {
        (self.end + 1).saturating_sub(self.start)
    }

    /// Check if a bar number falls within this section
    pub fn contains_bar(&self, bar: u32) -> bool {
        bar >= self.start && bar <= self.end
    }

    /// Velocity target for a bar, interpolated linearly across the section
    pub fn target_velocity(&self, bar: u32) -> f64 {
        let span = self.end.saturating_sub(self.start).max(1) as f64;
        let t = bar.saturating_sub(self.start) as f64 / span;
        let (vs, ve) = (self.velocity_start as f64, self.velocity_end as f64);
        vs + (ve - vs) * t
    }
}

/// Check that sections partition bars 1..=bars exactly
///
/// Errors name the first offending section or bar.
pub fn validate_sections(sections: &[Section], bars: u32) -> Result<(), ValidationError> {
    if bars == 0 {
        return Err(ValidationError::NonPositiveBars);
    }
    if sections.is_empty() {
        return Err(ValidationError::NoSections);
    }

    for (index, s) in sections.iter().enumerate() {
        if s.start > s.end {
            return Err(ValidationError::InvertedSection {
                index,
                start: s.start,
                end: s.end,
            });
        }
        if s.start == 0 || s.end > bars {
            let bar = if s.start == 0 { s.start } else { s.end };
            return Err(ValidationError::BarOutOfRange { index, bar, bars });
        }
    }

    // Walk the ranges in start order; `next` is the first bar not yet covered
    let mut ordered: Vec<&Section> = sections.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let mut next: u64 = 1;
    for s in ordered {
        let start = s.start as u64;
        if start > next {
            return Err(ValidationError::UncoveredBar { bar: next as u32 });
        }
        if start < next {
            return Err(ValidationError::OverlappingBar { bar: s.start });
        }
        next = s.end as u64 + 1;
    }

    if next <= bars as u64 {
        return Err(ValidationError::UncoveredBar { bar: next as u32 });
    }

    Ok(())
}

/// Complete section plan for an arrangement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPlan {
    pub sections: Vec<Section>,
    pub total_bars: u32,
}

impl SectionPlan {
    /// Validate and wrap a caller-supplied section list
    pub fn new(sections: Vec<Section>, total_bars: u32) -> Result<Self, ValidationError> {
        validate_sections(&sections, total_bars)?;
        Ok(SectionPlan {
            sections,
            total_bars,
        })
    }

    /// Get the section covering a bar
    pub fn section_at(&self, bar: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.contains_bar(bar))
    }

    /// Human-readable form, e.g. "intro (bars 1-4), verse (bars 5-9)"
    pub fn describe(&self) -> String {
        describe_sections(&self.sections)
    }

    /// Create a simple default plan based on bar count
    pub fn default_for(total_bars: u32) -> Self {
        use SectionKind::*;

        let sections = match total_bars {
            0 => Vec::new(),
            1..=4 => vec![Section::new(Verse, 1, total_bars, 70, 85)],
            5..=8 => vec![
                Section::new(Intro, 1, 2, 50, 65),
                Section::new(Verse, 3, total_bars, 65, 90),
            ],
            9..=16 => vec![
                Section::new(Intro, 1, 2, 45, 60),
                Section::new(Verse, 3, total_bars - 2, 60, 85),
                Section::new(Resolution, total_bars - 1, total_bars, 90, 100),
            ],
            _ => {
                // Intro and resolution frame a body that grows verse, chorus, solo, verse
                let body_end = total_bars - 4;
                let mut sections = vec![
                    Section::new(Intro, 1, 4, 45, 60),
                    Section::new(Verse, 5, body_end.min(12), 60, 80),
                ];
                if body_end > 12 {
                    sections.push(Section::new(Chorus, 13, body_end.min(16), 80, 95));
                }
                if body_end > 16 {
                    sections.push(Section::new(Solo, 17, body_end.min(24), 95, 115));
                }
                if body_end > 24 {
                    sections.push(Section::new(Verse, 25, body_end, 85, 90));
                }
                sections.push(Section::new(Resolution, body_end + 1, total_bars, 95, 100));
                sections
            }
        };

        SectionPlan {
            sections,
            total_bars,
        }
    }
}

/// Human-readable listing of sections in order
pub fn describe_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| format!("{} (bars {}-{})", s.kind.name(), s.start, s.end))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bachata_sections() -> Vec<Section> {
        vec![
            Section::new(SectionKind::Intro, 1, 4, 40, 60),
            Section::new(SectionKind::Verse, 5, 9, 60, 85),
            Section::new(SectionKind::Solo, 10, 14, 85, 115),
            Section::new(SectionKind::Resolution, 15, 16, 95, 100),
        ]
    }

    #[test]
    fn test_section_contains_bar() {
        let section = Section::new(SectionKind::Verse, 5, 9, 60, 85);
        assert!(section.contains_bar(5));
        assert!(section.contains_bar(9));
        assert!(!section.contains_bar(4));
        assert!(!section.contains_bar(10));
        assert_eq!(section.length_bars(), 5);
    }

    #[test]
    fn test_target_velocity_interpolates() {
        let section = Section::new(SectionKind::Solo, 10, 14, 85, 115);
        assert_eq!(section.target_velocity(10), 85.0);
        assert_eq!(section.target_velocity(12), 100.0);
        assert_eq!(section.target_velocity(14), 115.0);

        // Single-bar sections use the start target
        let single = Section::new(SectionKind::Intro, 3, 3, 50, 90);
        assert_eq!(single.target_velocity(3), 50.0);
    }

    #[test]
    fn test_valid_partition() {
        assert!(validate_sections(&bachata_sections(), 16).is_ok());
    }

    #[test]
    fn test_gap_names_first_uncovered_bar() {
        let sections = vec![
            Section::new(SectionKind::Intro, 1, 4, 50, 60),
            Section::new(SectionKind::Verse, 6, 10, 60, 80),
        ];
        assert_eq!(
            validate_sections(&sections, 10),
            Err(ValidationError::UncoveredBar { bar: 5 })
        );
    }

    #[test]
    fn test_overlap_detected() {
        let sections = vec![
            Section::new(SectionKind::Intro, 1, 4, 50, 60),
            Section::new(SectionKind::Verse, 4, 8, 60, 80),
        ];
        assert_eq!(
            validate_sections(&sections, 8),
            Err(ValidationError::OverlappingBar { bar: 4 })
        );
    }

    #[test]
    fn test_unordered_sections_validate_by_range() {
        let mut sections = bachata_sections();
        sections.reverse();
        assert!(validate_sections(&sections, 16).is_ok());

        let nested = vec![
            Section::new(SectionKind::Verse, 1, 8, 60, 80),
            Section::new(SectionKind::Solo, 3, 5, 80, 100),
        ];
        assert_eq!(
            validate_sections(&nested, 8),
            Err(ValidationError::OverlappingBar { bar: 3 })
        );

        let short = vec![Section::new(SectionKind::Verse, 1, 6, 60, 80)];
        assert_eq!(
            validate_sections(&short, 8),
            Err(ValidationError::UncoveredBar { bar: 7 })
        );
    }

    #[test]
    fn test_huge_bar_count_validates_without_walking_bars() {
        let bars = u32::MAX;
        let sections = vec![
            Section::new(SectionKind::Verse, 1, 1_000, 60, 80),
            Section::new(SectionKind::Solo, 1_001, bars, 80, 100),
        ];
        assert!(validate_sections(&sections, bars).is_ok());

        let gap = vec![
            Section::new(SectionKind::Verse, 1, 1_000, 60, 80),
            Section::new(SectionKind::Solo, 1_002, bars, 80, 100),
        ];
        assert_eq!(
            validate_sections(&gap, bars),
            Err(ValidationError::UncoveredBar { bar: 1_001 })
        );
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(validate_sections(&[], 8), Err(ValidationError::NoSections));
        assert_eq!(
            validate_sections(&bachata_sections(), 0),
            Err(ValidationError::NonPositiveBars)
        );

        let inverted = vec![Section::new(SectionKind::Verse, 5, 2, 60, 80)];
        assert!(matches!(
            validate_sections(&inverted, 8),
            Err(ValidationError::InvertedSection { index: 0, .. })
        ));

        let too_long = vec![Section::new(SectionKind::Verse, 1, 12, 60, 80)];
        assert_eq!(
            validate_sections(&too_long, 8),
            Err(ValidationError::BarOutOfRange {
                index: 0,
                bar: 12,
                bars: 8
            })
        );

        let zero = vec![Section::new(SectionKind::Verse, 0, 8, 60, 80)];
        assert!(matches!(
            validate_sections(&zero, 8),
            Err(ValidationError::BarOutOfRange { bar: 0, .. })
        ));
    }

    #[test]
    fn test_default_plans_always_partition() {
        for bars in 1..=64 {
            let plan = SectionPlan::default_for(bars);
            assert!(
                validate_sections(&plan.sections, bars).is_ok(),
                "default plan for {} bars: {:?}",
                bars,
                plan.sections
            );
        }
    }

    #[test]
    fn test_default_plan_long_form() {
        let plan = SectionPlan::default_for(32);
        let kinds: Vec<SectionKind> = plan.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Intro,
                SectionKind::Verse,
                SectionKind::Chorus,
                SectionKind::Solo,
                SectionKind::Verse,
                SectionKind::Resolution,
            ]
        );
        assert_eq!(plan.section_at(20).map(|s| s.kind), Some(SectionKind::Solo));
    }

    #[test]
    fn test_section_kind_names() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(SectionKind::from_name("Mambo"), Some(SectionKind::Mambo));
        assert_eq!(SectionKind::from_name("drop"), None);
    }

    #[test]
    fn test_describe() {
        let plan = SectionPlan::new(bachata_sections(), 16).unwrap();
        assert_eq!(
            plan.describe(),
            "intro (bars 1-4), verse (bars 5-9), solo (bars 10-14), resolution (bars 15-16)"
        );
    }
}
