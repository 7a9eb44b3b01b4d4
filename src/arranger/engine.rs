// Arrangement Engine - Bar-by-bar generation of role tracks
// The whole request is validated first; generation then walks bars in order for each role

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;

use super::section::{Section, SectionPlan, ValidationError};
use crate::catalog::{
    ConfigurationError, InstrumentProfile, PatternLibrary, PhraseAnchor, PhraseSet, RhythmPattern,
};
use crate::config::{ConfigError, EngineConfig};
use crate::genres::{ClaveOrientation, Genre, GenreConfig, Part, Registry, Role, RoleBinding, Voicing};
use crate::groove::{swung_offset, TimeSignature};
use crate::pitch::{
    build_chord, fit_register, parse_chord, parse_numeral, ChordSymbol, Key, MusicalDefault,
    ParsedChord, PitchError,
};

/// Errors that stop an arrangement run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArrangeError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Pitch error: {0}")]
    Pitch(#[from] PitchError),
}

/// What to arrange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrangementRequest {
    /// Genre id (e.g., "bachata")
    pub genre: String,

    pub key: Key,

    /// Beats per minute; `None` uses the midpoint of the genre's range
    pub tempo: Option<u32>,

    pub bars: u32,

    /// Section map; `None` uses the default plan for the bar count
    pub sections: Option<Vec<Section>>,

    /// Absolute chord symbols replacing the genre's default progression
    pub progression: Option<Vec<String>>,

    /// Clave orientation; `None` keeps the genre's own. Only clave genres accept one.
    #[serde(default)]
    pub clave: Option<ClaveOrientation>,
}

impl ArrangementRequest {
    pub fn new(genre: impl Into<String>, key: Key, bars: u32) -> Self {
        ArrangementRequest {
            genre: genre.into(),
            key,
            tempo: None,
            bars,
            sections: None,
            progression: None,
            clave: None,
        }
    }

    pub fn with_tempo(mut self, tempo: u32) -> Self {
        self.tempo = Some(tempo);
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = Some(sections);
        self
    }

    pub fn with_progression<S: AsRef<str>>(mut self, chords: &[S]) -> Self {
        self.progression = Some(chords.iter().map(|c| c.as_ref().to_string()).collect());
        self
    }

    pub fn with_clave(mut self, clave: ClaveOrientation) -> Self {
        self.clave = Some(clave);
        self
    }
}

/// A single timed note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub role: Role,

    /// MIDI note number
    pub pitch: u8,

    /// Start in beats from the top of the arrangement
    pub start: f64,

    /// Length in beats
    pub duration: f64,

    pub velocity: u8,
}

impl NoteEvent {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// All events for one role, in generation order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTrack {
    pub role: Role,
    pub profile: Arc<InstrumentProfile>,
    pub events: Vec<NoteEvent>,
}

impl RoleTrack {
    /// Latest end time of any event, 0 when silent
    pub fn end_beat(&self) -> f64 {
        self.events.iter().map(NoteEvent::end).fold(0.0, f64::max)
    }
}

/// Complete arrangement output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrangement {
    pub genre: Genre,
    pub display_name: String,

    /// Key the arrangement was played in
    pub key: Key,
    pub tempo: u32,
    pub bars: u32,
    pub time_signature: TimeSignature,
    pub sections: Vec<Section>,
    pub progression: Vec<ChordSymbol>,
    pub clave: Option<ClaveOrientation>,

    /// One track per declared role, in declaration order
    pub tracks: Vec<RoleTrack>,

    /// Musical defaults substituted for unrecognised input
    pub defaults_applied: Vec<MusicalDefault>,
}

impl Arrangement {
    pub fn track(&self, role: Role) -> Option<&RoleTrack> {
        self.tracks.iter().find(|t| t.role == role)
    }

    pub fn beats_per_bar(&self) -> f64 {
        self.time_signature.beats_per_bar()
    }

    /// Length of the arrangement in beats
    pub fn total_beats(&self) -> f64 {
        self.bars as f64 * self.beats_per_bar()
    }

    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(|t| t.events.len()).sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// SHA-256 of the serialized arrangement, hex encoded
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = self.to_json()?;
        Ok(hex::encode(Sha256::digest(json.as_bytes())))
    }
}

/// Everything about a request that can be checked before generation
struct PreparedRequest {
    key: Key,
    tempo: u32,
    plan: SectionPlan,
    progression: Vec<ChordSymbol>,
    defaults: Vec<MusicalDefault>,
    clave: Option<ClaveOrientation>,

    /// Replaces the genre's clave pattern when the request flips the orientation
    clave_pattern: Option<Arc<RhythmPattern>>,
}

impl PreparedRequest {
    fn pattern_for<'a>(
        &'a self,
        genre: &GenreConfig,
        pattern: &'a Arc<RhythmPattern>,
    ) -> &'a RhythmPattern {
        match (&self.clave_pattern, genre.clave) {
            (Some(swap), Some(default)) if pattern.id == default.pattern_id() => swap.as_ref(),
            _ => pattern.as_ref(),
        }
    }
}

/// Per-bar state shared by every part renderer
struct BarContext<'a> {
    bar_start: f64,
    beats_per_bar: f64,

    /// 0-based bar index within its section
    bar_in_section: u32,
    last_in_section: bool,

    /// Section velocity target for this bar
    velocity: f64,
    chord: ChordSymbol,
    key: &'a Key,
}

/// Runs arrangement requests against a shared registry
#[derive(Debug, Clone)]
pub struct ArrangementEngine {
    registry: Registry,
    config: EngineConfig,
}

impl ArrangementEngine {
    pub fn new(registry: Registry) -> Self {
        ArrangementEngine {
            registry,
            config: EngineConfig::default(),
        }
    }

    /// Engine with a custom config, rejected unless it validates
    pub fn with_config(registry: Registry, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ArrangementEngine { registry, config })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Arrange a request into per-role event tracks
    ///
    /// All configuration and validation errors surface before any event is
    /// produced. The output is a pure function of the registry, config and request.
    pub fn arrange(&self, request: &ArrangementRequest) -> Result<Arrangement, ArrangeError> {
        let genre = self.registry.resolve(&request.genre)?;
        let prepared = prepare(request, &genre, &self.registry.patterns)?;

        log::info!(
            "Arranging {} bars of {} in {} at {} BPM ({})",
            request.bars,
            genre.display_name,
            prepared.key,
            prepared.tempo,
            prepared.plan.describe()
        );

        let mut tracks = Vec::with_capacity(genre.roles.len());
        for binding in &genre.roles {
            let events = self.render_role(binding, &genre, &prepared)?;
            log::debug!("Role {} produced {} events", binding.role, events.len());
            tracks.push(RoleTrack {
                role: binding.role,
                profile: Arc::clone(&binding.profile),
                events,
            });
        }

        let arrangement = Arrangement {
            genre: genre.genre,
            display_name: genre.display_name.clone(),
            key: prepared.key,
            tempo: prepared.tempo,
            bars: request.bars,
            time_signature: genre.time_signature,
            sections: prepared.plan.sections,
            progression: prepared.progression,
            clave: prepared.clave,
            tracks,
            defaults_applied: prepared.defaults,
        };

        log::info!(
            "Arrangement complete: {} tracks, {} events",
            arrangement.tracks.len(),
            arrangement.event_count()
        );

        Ok(arrangement)
    }

    fn render_role(
        &self,
        binding: &RoleBinding,
        genre: &GenreConfig,
        prepared: &PreparedRequest,
    ) -> Result<Vec<NoteEvent>, ArrangeError> {
        let beats_per_bar = genre.beats_per_bar();
        let mut events = Vec::new();

        for bar in 1..=prepared.plan.total_bars {
            let section = prepared
                .plan
                .section_at(bar)
                .ok_or(ValidationError::UncoveredBar { bar })?;

            let ctx = BarContext {
                bar_start: (bar - 1) as f64 * beats_per_bar,
                beats_per_bar,
                bar_in_section: bar - section.start,
                last_in_section: bar == section.end,
                velocity: section.target_velocity(bar),
                chord: prepared.progression[(bar as usize - 1) % prepared.progression.len()],
                key: &prepared.key,
            };

            match genre.part_for(binding, section.kind) {
                Part::Pattern { pattern, voicing } => {
                    let pattern = prepared.pattern_for(genre, pattern);
                    self.render_pattern(&ctx, bar, pattern, voicing, binding, &mut events)?
                }
                Part::Phrases(set) => self.render_phrases(&ctx, set, binding, &mut events)?,
                Part::Sparse {
                    octave,
                    velocity_scale,
                } => self.render_sparse(&ctx, *octave, *velocity_scale, binding, &mut events)?,
                Part::Silent => {}
            }
        }

        Ok(events)
    }

    fn render_pattern(
        &self,
        ctx: &BarContext,
        bar: u32,
        pattern: &RhythmPattern,
        voicing: &Voicing,
        binding: &RoleBinding,
        out: &mut Vec<NoteEvent>,
    ) -> Result<(), PitchError> {
        let cycle_bar = (bar - 1) % pattern.cycle_bars;
        let window_start = cycle_bar as f64 * ctx.beats_per_bar;

        for (index, onset) in pattern.onsets_in_bar(cycle_bar) {
            let offset = swung_offset(onset.offset, pattern.subdivision, pattern.swing_amount)
                - window_start;
            let velocity = binding
                .profile
                .clamp_velocity(ctx.velocity + onset.velocity_delta as f64);

            for pitch in self.voice_onset(voicing, index, ctx.chord)? {
                out.push(NoteEvent {
                    role: binding.role,
                    pitch,
                    start: ctx.bar_start + offset,
                    duration: onset.duration,
                    velocity,
                });
            }
        }

        Ok(())
    }

    fn voice_onset(
        &self,
        voicing: &Voicing,
        onset_index: usize,
        chord: ChordSymbol,
    ) -> Result<Vec<u8>, PitchError> {
        match voicing {
            Voicing::Chord { octave, max_tones } => {
                let voiced = build_chord(chord, *octave, &self.config)?;
                Ok(voiced.pitches.into_iter().take(*max_tones).collect())
            }
            Voicing::ChordToneCycle { octave, tones } => {
                let Some(tone) = tones.get(onset_index % tones.len().max(1)) else {
                    return Ok(Vec::new());
                };
                let voiced = build_chord(chord, *octave, &self.config)?;
                Ok(vec![fit_register(voiced.tone(*tone), &self.config)?])
            }
            Voicing::Percussion { keys } => Ok(keys
                .get(onset_index % keys.len().max(1))
                .copied()
                .into_iter()
                .collect()),
        }
    }

    fn render_phrases(
        &self,
        ctx: &BarContext,
        set: &PhraseSet,
        binding: &RoleBinding,
        out: &mut Vec<NoteEvent>,
    ) -> Result<(), PitchError> {
        for note in set.bar(ctx.bar_in_section, ctx.last_in_section) {
            let raw = match set.anchor {
                PhraseAnchor::Scale => ctx.key.degree_pitch(note.degree, note.octave),
                PhraseAnchor::ChordTones => {
                    let voiced = build_chord(ctx.chord, note.octave, &self.config)?;
                    voiced.tone(note.degree.max(1) as usize - 1)
                }
            };

            out.push(NoteEvent {
                role: binding.role,
                pitch: fit_register(raw, &self.config)?,
                start: ctx.bar_start + note.offset,
                duration: note.duration,
                velocity: binding.profile.clamp_velocity(note.velocity as f64),
            });
        }

        Ok(())
    }

    fn render_sparse(
        &self,
        ctx: &BarContext,
        octave: i8,
        velocity_scale: f64,
        binding: &RoleBinding,
        out: &mut Vec<NoteEvent>,
    ) -> Result<(), PitchError> {
        let root = ctx.chord.root.pitch(octave as i32);

        out.push(NoteEvent {
            role: binding.role,
            pitch: fit_register(root, &self.config)?,
            start: ctx.bar_start,
            duration: ctx.beats_per_bar,
            velocity: binding.profile.clamp_velocity(ctx.velocity * velocity_scale),
        });

        Ok(())
    }
}

/// Validate a request and resolve its defaults
fn prepare(
    request: &ArrangementRequest,
    genre: &GenreConfig,
    patterns: &PatternLibrary,
) -> Result<PreparedRequest, ArrangeError> {
    if request.bars == 0 {
        return Err(ValidationError::NonPositiveBars.into());
    }

    let tempo = match request.tempo {
        Some(0) => return Err(ValidationError::NonPositiveTempo.into()),
        Some(tempo) => tempo,
        None => {
            let tempo = genre.default_tempo();
            log::info!("No tempo given, using {} BPM for {}", tempo, genre.genre);
            tempo
        }
    };

    let plan = match &request.sections {
        Some(sections) => SectionPlan::new(sections.clone(), request.bars)?,
        None => SectionPlan::default_for(request.bars),
    };

    // Numerals are written for the genre's mode; an explicit progression keeps the caller's key
    let key = match &request.progression {
        Some(_) => request.key,
        None => genre.key_for(request.key.root),
    };
    if key != request.key {
        log::info!(
            "{} progression is written in {}, arranging in {} instead of {}",
            genre.genre,
            genre.default_mode.name(),
            key,
            request.key
        );
    }

    let parsed: Vec<ParsedChord> = match &request.progression {
        Some(chords) => {
            if chords.is_empty() {
                return Err(ValidationError::EmptyProgression.into());
            }
            chords
                .iter()
                .map(|c| parse_chord(c))
                .collect::<Result<_, _>>()?
        }
        None => {
            if genre.progression.is_empty() {
                return Err(ValidationError::EmptyProgression.into());
            }
            genre
                .progression
                .iter()
                .map(|n| parse_numeral(n, &key))
                .collect::<Result<_, _>>()?
        }
    };

    let mut progression = Vec::with_capacity(parsed.len());
    let mut defaults = Vec::new();
    for chord in parsed {
        if let Some(default) = chord.default_applied {
            log::warn!("Musical default applied: {}", default);
            defaults.push(default);
        }
        progression.push(chord.symbol);
    }

    let (clave, clave_pattern) = resolve_clave(request, genre, patterns)?;

    Ok(PreparedRequest {
        key,
        tempo,
        plan,
        progression,
        defaults,
        clave,
        clave_pattern,
    })
}

/// Orientation to play, plus the pattern replacing the genre's when it flips
fn resolve_clave(
    request: &ArrangementRequest,
    genre: &GenreConfig,
    patterns: &PatternLibrary,
) -> Result<(Option<ClaveOrientation>, Option<Arc<RhythmPattern>>), ArrangeError> {
    let (default, requested) = match (genre.clave, request.clave) {
        (None, None) => return Ok((None, None)),
        (None, Some(_)) => {
            return Err(ValidationError::ClaveNotSupported(genre.genre.to_string()).into())
        }
        (Some(default), None) => return Ok((Some(default), None)),
        (Some(default), Some(requested)) if requested == default => {
            return Ok((Some(default), None))
        }
        (Some(default), Some(requested)) => (default, requested),
    };

    let pattern = patterns.get(requested.pattern_id())?;
    if (pattern.beats_per_bar - genre.beats_per_bar()).abs() > 1e-9 {
        return Err(ConfigurationError::MeterMismatch {
            genre: genre.genre.to_string(),
            item: pattern.id.clone(),
            expected: genre.beats_per_bar(),
            found: pattern.beats_per_bar,
        }
        .into());
    }

    log::debug!("Clave flipped from {} to {}", default.label(), requested.label());
    Ok((Some(requested), Some(pattern)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arranger::section::SectionKind;
    use crate::config::PitchPolicy;

    fn engine() -> ArrangementEngine {
        ArrangementEngine::new(Registry::builtin().unwrap())
    }

    fn bachata_request() -> ArrangementRequest {
        ArrangementRequest::new("bachata", Key::parse("E").unwrap(), 16)
            .with_tempo(115)
            .with_sections(vec![
                Section::new(SectionKind::Intro, 1, 4, 40, 60),
                Section::new(SectionKind::Verse, 5, 9, 60, 85),
                Section::new(SectionKind::Solo, 10, 14, 85, 115),
                Section::new(SectionKind::Resolution, 15, 16, 95, 100),
            ])
    }

    #[test]
    fn test_bachata_lead_spans_the_arrangement() {
        let arrangement = engine().arrange(&bachata_request()).unwrap();
        let lead = arrangement.track(Role::Lead).unwrap();

        assert_eq!(lead.events.first().map(|e| e.start), Some(0.0));
        assert!(lead.events.iter().all(|e| e.start >= 0.0 && e.start < 64.0));
        assert_eq!(lead.end_beat(), 64.0);

        // Held tonic to close: E4
        let last = lead.events.last().unwrap();
        assert_eq!(last.pitch, 64);
        assert_eq!(last.start, 62.0);
        assert_eq!(last.duration, 2.0);
    }

    #[test]
    fn test_lead_starts_strictly_increase_within_sections() {
        let arrangement = engine().arrange(&bachata_request()).unwrap();
        let lead = arrangement.track(Role::Lead).unwrap();

        for section in &arrangement.sections {
            let lo = (section.start - 1) as f64 * 4.0;
            let hi = section.end as f64 * 4.0;
            let starts: Vec<f64> = lead
                .events
                .iter()
                .filter(|e| e.start >= lo && e.start < hi)
                .map(|e| e.start)
                .collect();
            assert!(!starts.is_empty());
            assert!(starts.windows(2).all(|w| w[0] < w[1]), "{:?}", section);
        }
    }

    #[test]
    fn test_velocities_stay_in_profile_range() {
        let arrangement = engine().arrange(&bachata_request()).unwrap();
        for track in &arrangement.tracks {
            let (lo, hi) = track.profile.velocity_range;
            assert!(track
                .events
                .iter()
                .all(|e| e.velocity >= lo && e.velocity <= hi));
        }
    }

    #[test]
    fn test_pattern_velocity_follows_section_target() {
        let arrangement = engine().arrange(&bachata_request()).unwrap();
        let rhythm = arrangement.track(Role::Rhythm).unwrap();

        // Bar 5 is the first verse bar: derecho downbeat = 60 + 10
        let downbeat = rhythm.events.iter().find(|e| e.start == 16.0).unwrap();
        assert_eq!(downbeat.velocity, 70);
    }

    #[test]
    fn test_sparse_override_in_solo() {
        let arrangement = engine().arrange(&bachata_request()).unwrap();
        let rhythm = arrangement.track(Role::Rhythm).unwrap();

        let solo: Vec<&NoteEvent> = rhythm
            .events
            .iter()
            .filter(|e| e.start >= 36.0 && e.start < 56.0)
            .collect();
        assert_eq!(solo.len(), 5);
        assert!(solo.iter().all(|e| e.duration == 4.0));

        // Bar 10 lands on vi in E major: C#2, at half the solo target
        assert_eq!(solo[0].pitch, 37);
        assert_eq!(solo[0].velocity, 45);
    }

    #[test]
    fn test_guira_silent_in_intro() {
        let arrangement = engine().arrange(&bachata_request()).unwrap();
        let guira = arrangement.track(Role::Percussion2).unwrap();
        assert!(guira.events.iter().all(|e| e.start >= 16.0));
    }

    #[test]
    fn test_unknown_genre_fails_first() {
        let request = ArrangementRequest::new("tango", Key::parse("Am").unwrap(), 0);
        assert_eq!(
            engine().arrange(&request),
            Err(ArrangeError::Configuration(ConfigurationError::UnknownGenre(
                "tango".to_string()
            )))
        );
    }

    #[test]
    fn test_zero_tempo_and_bars_rejected() {
        let key = Key::parse("C").unwrap();
        let no_bars = ArrangementRequest::new("generic", key, 0);
        assert_eq!(
            engine().arrange(&no_bars),
            Err(ArrangeError::Validation(ValidationError::NonPositiveBars))
        );

        let no_tempo = ArrangementRequest::new("generic", key, 8).with_tempo(0);
        assert_eq!(
            engine().arrange(&no_tempo),
            Err(ArrangeError::Validation(ValidationError::NonPositiveTempo))
        );
    }

    #[test]
    fn test_empty_progression_rejected() {
        let request = ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8)
            .with_progression::<&str>(&[]);
        assert_eq!(
            engine().arrange(&request),
            Err(ArrangeError::Validation(ValidationError::EmptyProgression))
        );
    }

    #[test]
    fn test_unknown_suffix_records_default() {
        let request = ArrangementRequest::new("generic", Key::parse("C").unwrap(), 4)
            .with_progression(&["C", "Fzz", "G7"]);
        let arrangement = engine().arrange(&request).unwrap();

        assert_eq!(arrangement.defaults_applied.len(), 1);
        assert_eq!(arrangement.defaults_applied[0].symbol, "Fzz");
        assert_eq!(arrangement.progression[1].to_string(), "F");
    }

    #[test]
    fn test_invalid_chord_root_fails() {
        let request = ArrangementRequest::new("generic", Key::parse("C").unwrap(), 4)
            .with_progression(&["C", "H7"]);
        assert!(matches!(
            engine().arrange(&request),
            Err(ArrangeError::Pitch(PitchError::InvalidChord(_)))
        ));
    }

    #[test]
    fn test_defaults_fill_tempo_and_sections() {
        let request = ArrangementRequest::new("merengue", Key::parse("C").unwrap(), 12);
        let arrangement = engine().arrange(&request).unwrap();
        assert_eq!(arrangement.tempo, 160);
        assert_eq!(arrangement.sections, SectionPlan::default_for(12).sections);
        assert_eq!(arrangement.total_beats(), 24.0);
    }

    #[test]
    fn test_reject_policy_surfaces_pitch_error() {
        let config = EngineConfig {
            max_octave: 3,
            scale_octaves: (2, 3),
            pitch_policy: PitchPolicy::Reject,
            ..EngineConfig::default()
        };
        let engine = ArrangementEngine::with_config(Registry::builtin().unwrap(), config).unwrap();
        let result = engine.arrange(&bachata_request());
        assert!(matches!(
            result,
            Err(ArrangeError::Pitch(PitchError::PitchOutOfRange { .. }))
        ));
    }

    fn pitch_classes(arrangement: &Arrangement, role: Role) -> std::collections::BTreeSet<u8> {
        arrangement
            .track(role)
            .map(|t| t.events.iter().map(|e| e.pitch % 12).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_minor_request_follows_genre_mode() {
        let request = ArrangementRequest::new("bachata", Key::parse("Am").unwrap(), 8);
        let arrangement = engine().arrange(&request).unwrap();

        assert_eq!(arrangement.key, Key::parse("A").unwrap());
        let chords: Vec<String> = arrangement.progression.iter().map(|c| c.to_string()).collect();
        assert_eq!(chords, vec!["A", "F#m", "D", "E7"]);

        // A major: A B C# D E F# G#
        let a_major = [9, 11, 1, 2, 4, 6, 8];
        for role in [Role::Lead, Role::Rhythm, Role::Bass] {
            let classes = pitch_classes(&arrangement, role);
            assert!(!classes.is_empty());
            assert!(
                classes.iter().all(|pc| a_major.contains(pc)),
                "{} plays {:?}",
                role,
                classes
            );
        }
    }

    #[test]
    fn test_explicit_progression_keeps_requested_key() {
        let request = ArrangementRequest::new("bachata", Key::parse("Am").unwrap(), 8)
            .with_progression(&["Am", "Dm", "E7", "Am"]);
        let arrangement = engine().arrange(&request).unwrap();

        assert_eq!(arrangement.key, Key::parse("Am").unwrap());

        // A natural minor
        let a_minor = [9, 11, 0, 2, 4, 5, 7];
        let lead = pitch_classes(&arrangement, Role::Lead);
        assert!(lead.iter().all(|pc| a_minor.contains(pc)), "{:?}", lead);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = EngineConfig {
            min_octave: 5,
            max_octave: 3,
            ..EngineConfig::default()
        };
        let result = ArrangementEngine::with_config(Registry::builtin().unwrap(), config);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let narrow = EngineConfig {
            min_octave: 2,
            max_octave: 6,
            ..EngineConfig::default()
        };
        let engine = ArrangementEngine::with_config(Registry::builtin().unwrap(), narrow).unwrap();
        let arrangement = engine.arrange(&bachata_request()).unwrap();
        let lowest = engine.config().lowest_pitch();
        let highest = engine.config().highest_pitch();
        let pitched = arrangement
            .tracks
            .iter()
            .filter(|t| !matches!(t.role, Role::Percussion1 | Role::Percussion2));
        for track in pitched {
            assert!(track
                .events
                .iter()
                .all(|e| (lowest..=highest).contains(&(e.pitch as i32))));
        }
    }

    fn clave_per_bar(arrangement: &Arrangement) -> Vec<usize> {
        let clave = arrangement.track(Role::Clave).unwrap();
        (0..arrangement.bars)
            .map(|bar| {
                let (lo, hi) = (bar as f64 * 4.0, (bar + 1) as f64 * 4.0);
                clave.events.iter().filter(|e| e.start >= lo && e.start < hi).count()
            })
            .collect()
    }

    #[test]
    fn test_request_flips_clave() {
        let request = ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8)
            .with_clave(ClaveOrientation::ThreeTwo);
        let arrangement = engine().arrange(&request).unwrap();

        assert_eq!(arrangement.clave, Some(ClaveOrientation::ThreeTwo));
        assert_eq!(clave_per_bar(&arrangement), vec![3, 2, 3, 2, 3, 2, 3, 2]);
    }

    #[test]
    fn test_genre_clave_is_the_default() {
        let engine = engine();
        let plain = engine
            .arrange(&ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8))
            .unwrap();
        let explicit = engine
            .arrange(
                &ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8)
                    .with_clave(ClaveOrientation::TwoThree),
            )
            .unwrap();

        assert_eq!(plain.clave, Some(ClaveOrientation::TwoThree));
        assert_eq!(plain, explicit);
        assert_eq!(clave_per_bar(&plain), vec![2, 3, 2, 3, 2, 3, 2, 3]);
    }

    #[test]
    fn test_clave_rejected_for_genre_without_one() {
        let request = ArrangementRequest::new("bachata", Key::parse("E").unwrap(), 8)
            .with_clave(ClaveOrientation::ThreeTwo);
        assert_eq!(
            engine().arrange(&request),
            Err(ArrangeError::Validation(ValidationError::ClaveNotSupported(
                "bachata".to_string()
            )))
        );
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let engine = engine();
        let a = engine.arrange(&bachata_request()).unwrap();
        let b = engine.arrange(&bachata_request()).unwrap();
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }
}
