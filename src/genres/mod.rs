// Genres Module
// Genre bundles resolved against the catalogs once, then shared read-only

pub mod types;
mod bachata;
mod bolero;
mod generic;
mod merengue;
mod salsa;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{ConfigurationError, InstrumentCatalog, PatternLibrary, PhraseLibrary};

const METER_EPSILON: f64 = 1e-9;

/// Authored specs for every built-in genre
pub fn builtin_specs() -> Vec<GenreSpec> {
    vec![
        bachata::bachata_spec(),
        bolero::bolero_spec(),
        salsa::salsa_spec(),
        merengue::merengue_spec(),
        generic::generic_spec(),
    ]
}

/// Resolved genre configurations keyed by genre id
#[derive(Debug, Clone, Default)]
pub struct GenreRegistry {
    genres: BTreeMap<String, Arc<GenreConfig>>,
}

impl GenreRegistry {
    /// Resolve every spec against the catalogs, failing on the first bad reference
    pub fn load(
        specs: Vec<GenreSpec>,
        instruments: &InstrumentCatalog,
        patterns: &PatternLibrary,
        phrases: &PhraseLibrary,
    ) -> Result<Self, ConfigurationError> {
        let mut registry = GenreRegistry::default();

        for spec in specs {
            let config = resolve_spec(&spec, instruments, patterns, phrases)?;
            log::debug!(
                "Loaded genre '{}' with {} roles and {} overrides",
                config.genre,
                config.roles.len(),
                config.overrides.len()
            );
            registry
                .genres
                .insert(spec.genre.id().to_string(), Arc::new(config));
        }

        Ok(registry)
    }

    /// Look up a genre by id
    pub fn resolve(&self, id: &str) -> Result<Arc<GenreConfig>, ConfigurationError> {
        self.genres
            .get(&id.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownGenre(id.to_string()))
    }

    /// All genre ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        self.genres.keys().map(String::as_str).collect()
    }
}

/// The four read-only stores the engine needs, bundled for injection
#[derive(Debug, Clone)]
pub struct Registry {
    pub instruments: Arc<InstrumentCatalog>,
    pub patterns: Arc<PatternLibrary>,
    pub phrases: Arc<PhraseLibrary>,
    pub genres: Arc<GenreRegistry>,
}

impl Registry {
    /// Build the catalogs and resolve the built-in genres
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::with_specs(builtin_specs())
    }

    /// Build the catalogs and resolve custom genre specs against them
    pub fn with_specs(specs: Vec<GenreSpec>) -> Result<Self, ConfigurationError> {
        let instruments = InstrumentCatalog::builtin()?;
        let patterns = PatternLibrary::builtin()?;
        let phrases = PhraseLibrary::builtin()?;
        let genres = GenreRegistry::load(specs, &instruments, &patterns, &phrases)?;

        log::info!(
            "Registry ready: {} instruments, {} patterns, {} phrase sets, genres {:?}",
            instruments.len(),
            patterns.len(),
            phrases.len(),
            genres.ids()
        );

        Ok(Registry {
            instruments: Arc::new(instruments),
            patterns: Arc::new(patterns),
            phrases: Arc::new(phrases),
            genres: Arc::new(genres),
        })
    }

    pub fn resolve(&self, genre: &str) -> Result<Arc<GenreConfig>, ConfigurationError> {
        self.genres.resolve(genre)
    }
}

fn resolve_spec(
    spec: &GenreSpec,
    instruments: &InstrumentCatalog,
    patterns: &PatternLibrary,
    phrases: &PhraseLibrary,
) -> Result<GenreConfig, ConfigurationError> {
    let genre_id = spec.genre.id();
    let beats_per_bar = spec.time_signature.beats_per_bar();

    let check_meter = |item: &str, found: f64| -> Result<(), ConfigurationError> {
        if (found - beats_per_bar).abs() > METER_EPSILON {
            return Err(ConfigurationError::MeterMismatch {
                genre: genre_id.to_string(),
                item: item.to_string(),
                expected: beats_per_bar,
                found,
            });
        }
        Ok(())
    };

    let mut pattern_map = BTreeMap::new();
    for (pattern_role, pattern_id) in &spec.patterns {
        let pattern = patterns.get(pattern_id)?;
        check_meter(pattern_id, pattern.beats_per_bar)?;
        pattern_map.insert(pattern_role.to_string(), pattern);
    }

    if let Some(clave) = spec.clave {
        let bound = pattern_map.get(CLAVE_PATTERN_ROLE).ok_or_else(|| {
            ConfigurationError::MissingPatternRole {
                genre: genre_id.to_string(),
                pattern_role: CLAVE_PATTERN_ROLE.to_string(),
            }
        })?;
        if bound.id != clave.pattern_id() {
            return Err(ConfigurationError::ClaveMismatch {
                genre: genre_id.to_string(),
                orientation: clave.label().to_string(),
                pattern: bound.id.clone(),
            });
        }
    }

    let resolve_part = |role: Role, part: &PartSpec| -> Result<Part, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidRole {
            genre: genre_id.to_string(),
            role: role.name().to_string(),
            reason: reason.to_string(),
        };

        match part {
            PartSpec::Pattern {
                pattern_role,
                voicing,
            } => {
                let pattern = pattern_map.get(*pattern_role).cloned().ok_or_else(|| {
                    ConfigurationError::MissingPatternRole {
                        genre: genre_id.to_string(),
                        pattern_role: pattern_role.to_string(),
                    }
                })?;
                match voicing {
                    Voicing::Chord { max_tones: 0, .. } => {
                        return Err(invalid("chord voicing with no tones"))
                    }
                    Voicing::ChordToneCycle { tones, .. } if tones.is_empty() => {
                        return Err(invalid("empty chord-tone cycle"))
                    }
                    Voicing::Percussion { keys } if keys.is_empty() || keys.iter().any(|k| *k > 127) => {
                        return Err(invalid("percussion voicing needs keys in 0..=127"))
                    }
                    _ => {}
                }
                Ok(Part::Pattern {
                    pattern,
                    voicing: voicing.clone(),
                })
            }
            PartSpec::Phrases(set_id) => {
                let set = phrases.get(set_id)?;
                check_meter(set_id, set.beats_per_bar)?;
                Ok(Part::Phrases(set))
            }
            PartSpec::Sparse {
                octave,
                velocity_scale,
            } => {
                if *velocity_scale <= 0.0 {
                    return Err(invalid("sparse velocity scale must be positive"));
                }
                Ok(Part::Sparse {
                    octave: *octave,
                    velocity_scale: *velocity_scale,
                })
            }
            PartSpec::Silent => Ok(Part::Silent),
        }
    };

    let mut roles: Vec<RoleBinding> = Vec::with_capacity(spec.roles.len());
    for role_spec in &spec.roles {
        if roles.iter().any(|b| b.role == role_spec.role) {
            return Err(ConfigurationError::InvalidRole {
                genre: genre_id.to_string(),
                role: role_spec.role.name().to_string(),
                reason: "declared twice".to_string(),
            });
        }
        roles.push(RoleBinding {
            role: role_spec.role,
            profile: instruments.get(role_spec.instrument)?,
            part: resolve_part(role_spec.role, &role_spec.part)?,
        });
    }

    let mut overrides = BTreeMap::new();
    for o in &spec.overrides {
        if !roles.iter().any(|b| b.role == o.role) {
            return Err(ConfigurationError::InvalidRole {
                genre: genre_id.to_string(),
                role: o.role.name().to_string(),
                reason: "override for an undeclared role".to_string(),
            });
        }
        overrides.insert((o.role, o.section), resolve_part(o.role, &o.part)?);
    }

    Ok(GenreConfig {
        genre: spec.genre,
        display_name: spec.display_name.to_string(),
        tempo_range: spec.tempo_range,
        time_signature: spec.time_signature,
        swing: spec.swing,
        clave: spec.clave,
        default_mode: spec.default_mode,
        roles,
        patterns: pattern_map,
        overrides,
        progression: spec.progression.iter().map(|s| s.to_string()).collect(),
        frequency_profile: spec
            .frequency_profile
            .iter()
            .map(|(name, band)| (name.to_string(), *band))
            .collect(),
        negative_tags: spec.negative_tags.iter().map(|s| s.to_string()).collect(),
        style_hint: spec.style_hint.to_string(),
    })
}

// Re-export main types
pub use types::{
    ClaveOrientation, Genre, GenreConfig, GenreSpec, OverrideSpec, Part, PartSpec, Role,
    RoleBinding, RoleSpec, SwingClass, Voicing, CLAVE_PATTERN_ROLE,
};
