// Render Presets - Named style bundles for one-click rendering
// Genres the registry does not know fall back to the generic tropical config

use serde::Serialize;
use thiserror::Error;

use super::composer::PromptParams;
use super::renderer::RenderRequest;
use crate::catalog::ConfigurationError;
use crate::genres::{Genre, Registry};
use crate::pitch::{Key, PitchError};

/// Errors turning a preset into a render request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Preset key is invalid: {0}")]
    Key(#[from] PitchError),
}

/// Named bundle of genre, tempo, key, creative level and style hint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPreset {
    pub id: &'static str,

    /// Genre id; may name a style outside the arrangement registry
    pub genre: &'static str,

    pub tempo: u32,

    /// Key shorthand, e.g. "Am"
    pub key: &'static str,

    pub creative_level: i32,
    pub description: &'static str,
    pub hint: &'static str,
}

/// Preset used when a lookup misses
pub const DEFAULT_PRESET: &str = "bachata_romantica";

pub static PRESETS: [RenderPreset; 8] = [
    RenderPreset {
        id: "bachata_romantica",
        genre: "bachata",
        tempo: 130,
        key: "Am",
        creative_level: 30,
        description: "Bachata romántica tradicional para enamorar",
        hint: "romantic slow bachata, heartfelt lyrics, smooth guitar",
    },
    RenderPreset {
        id: "bachata_moderna",
        genre: "bachata",
        tempo: 140,
        key: "Em",
        creative_level: 60,
        description: "Bachata moderna con toques urbanos",
        hint: "modern bachata, urban influences, catchy melody",
    },
    RenderPreset {
        id: "bolero_clasico",
        genre: "bolero",
        tempo: 80,
        key: "Dm",
        creative_level: 20,
        description: "Bolero clásico para noches de luna",
        hint: "classic Cuban bolero, romantic, expressive vocals",
    },
    RenderPreset {
        id: "merengue_fiesta",
        genre: "merengue",
        tempo: 160,
        key: "C",
        creative_level: 50,
        description: "Merengue para bailar hasta el amanecer",
        hint: "energetic merengue, party atmosphere, fast tempo",
    },
    RenderPreset {
        id: "salsa_dura",
        genre: "salsa",
        tempo: 180,
        key: "G",
        creative_level: 45,
        description: "Salsa brava con descarga",
        hint: "hard salsa, brass section, Cuban son influences",
    },
    RenderPreset {
        id: "tropical_fusion",
        genre: "tropical",
        tempo: 125,
        key: "Gm",
        creative_level: 85,
        description: "Fusión experimental tropical",
        hint: "experimental fusion, mixing tropical with electronic",
    },
    RenderPreset {
        id: "cumbia_colombiana",
        genre: "cumbia",
        tempo: 95,
        key: "D",
        creative_level: 35,
        description: "Cumbia colombiana tradicional",
        hint: "Colombian cumbia, accordion, guacharaca, festive",
    },
    RenderPreset {
        id: "reggaeton_caliente",
        genre: "reggaeton",
        tempo: 92,
        key: "Fm",
        creative_level: 55,
        description: "Reggaeton urbano para el perreo",
        hint: "reggaeton, dembow beat, 808 bass, urban latin",
    },
];

/// Look up a preset by id
pub fn preset(id: &str) -> Option<&'static RenderPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// Look up a preset, falling back to the romantic bachata preset
pub fn preset_or_default(id: &str) -> &'static RenderPreset {
    preset(id)
        .or_else(|| preset(DEFAULT_PRESET))
        .unwrap_or(&PRESETS[0])
}

impl RenderPreset {
    pub fn parse_key(&self) -> Result<Key, PitchError> {
        Key::parse(self.key)
    }

    /// Prompt inputs for `bars` bars in this preset's style
    pub fn prompt_params(&self, bars: u32) -> Result<PromptParams, PitchError> {
        Ok(PromptParams::new(self.parse_key()?, bars)
            .with_tempo(self.tempo)
            .with_hint(self.hint)
            .with_creative_level(self.creative_level))
    }

    /// Compose a render request against the registry
    pub fn request(
        &self,
        registry: &Registry,
        bars: u32,
        lyrics: &str,
    ) -> Result<RenderRequest, PresetError> {
        let config = match registry.resolve(self.genre) {
            Ok(config) => config,
            Err(ConfigurationError::UnknownGenre(_)) => {
                log::debug!(
                    "Preset '{}' genre '{}' not arrangeable, using {}",
                    self.id,
                    self.genre,
                    Genre::Generic
                );
                registry.resolve(Genre::Generic.id())?
            }
            Err(e) => return Err(e.into()),
        };

        let params = self.prompt_params(bars)?;
        Ok(RenderRequest::compose(&config, &params, lyrics, None))
    }
}

/// Compose a render request from a preset id
pub fn preset_request(
    registry: &Registry,
    id: &str,
    bars: u32,
    lyrics: &str,
) -> Result<RenderRequest, PresetError> {
    let preset = preset(id).ok_or_else(|| PresetError::UnknownPreset(id.to_string()))?;
    preset.request(registry, bars, lyrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_key_parses() {
        for preset in &PRESETS {
            assert!(preset.parse_key().is_ok(), "bad key in {}", preset.id);
            assert!((0..=100).contains(&preset.creative_level));
        }
    }

    #[test]
    fn test_lookup_and_fallback() {
        assert_eq!(preset("salsa_dura").unwrap().tempo, 180);
        assert!(preset("polka").is_none());
        assert_eq!(preset_or_default("polka").id, "bachata_romantica");
    }

    #[test]
    fn test_preset_request_uses_registered_genre() {
        let registry = Registry::builtin().unwrap();
        let request = preset_request(&registry, "merengue_fiesta", 16, "").unwrap();

        assert!(request.prompt.text.contains("Time signature: 2/4."));
        assert!(request.prompt.text.contains("BPM: 160."));
        assert!(request.prompt.style.starts_with("energetic merengue"));
        assert_eq!(request.parameters().level, 50);
        // 16 bars of 2/4 at 160 bpm
        assert_eq!(request.duration_secs, 12.0);
    }

    #[test]
    fn test_unregistered_genre_falls_back_to_generic() {
        let registry = Registry::builtin().unwrap();
        let request = preset_request(&registry, "cumbia_colombiana", 8, "").unwrap();

        let generic = registry.resolve("generic").unwrap();
        assert!(request.prompt.style.contains(&generic.style_hint));
        assert!(request.prompt.text.contains("Key: D major."));
    }

    #[test]
    fn test_unknown_preset_id() {
        let registry = Registry::builtin().unwrap();
        let err = preset_request(&registry, "polka", 8, "").unwrap_err();
        assert_eq!(err, PresetError::UnknownPreset("polka".to_string()));
    }
}
