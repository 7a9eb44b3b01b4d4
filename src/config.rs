// Engine Configuration - Register bounds, pitch policy and export defaults
// Loaded from TOML; every field falls back to its default when absent

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// What to do with a pitch that lands outside the supported octave range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchPolicy {
    /// Shift by whole octaves into the nearest valid register
    ClampOctave,

    /// Fail the run with `PitchError::PitchOutOfRange`
    Reject,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lowest octave a pitch may resolve to
    pub min_octave: i8,

    /// Highest octave a pitch may resolve to
    pub max_octave: i8,

    /// Octave span covered by scale tables (inclusive)
    pub scale_octaves: (i8, i8),

    /// Out-of-range pitch handling
    pub pitch_policy: PitchPolicy,

    /// Velocity jitter (+/-) used by seeded variations
    pub variation_spread: u8,

    /// Pulses per quarter note for MIDI export
    pub ppq: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            min_octave: 0,
            max_octave: 8,
            scale_octaves: (2, 6),
            pitch_policy: PitchPolicy::ClampOctave,
            variation_spread: 8,
            ppq: 480,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Check bounds for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_octave < 0 || self.max_octave > 8 || self.min_octave > self.max_octave {
            return Err(ConfigError::Invalid(format!(
                "octave bounds must satisfy 0 <= min <= max <= 8, got {}..={}",
                self.min_octave, self.max_octave
            )));
        }

        let (lo, hi) = self.scale_octaves;
        if lo > hi || lo < self.min_octave || hi > self.max_octave {
            return Err(ConfigError::Invalid(format!(
                "scale octaves {}..={} must lie within {}..={}",
                lo, hi, self.min_octave, self.max_octave
            )));
        }

        if self.ppq == 0 {
            return Err(ConfigError::Invalid("ppq must be positive".to_string()));
        }

        Ok(())
    }

    /// Lowest valid pitch number (C of `min_octave`)
    pub fn lowest_pitch(&self) -> i32 {
        12 * (self.min_octave as i32 + 1)
    }

    /// Highest valid pitch number (B of `max_octave`)
    pub fn highest_pitch(&self) -> i32 {
        12 * (self.max_octave as i32 + 1) + 11
    }
}
