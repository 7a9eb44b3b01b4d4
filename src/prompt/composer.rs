// Prompt Composer - Describe a resolved genre as text for the audio renderer
// Pure formatting: no note events and no validation beyond defaulting empty inputs

use serde::{Deserialize, Serialize};

use super::creative::{creative_parameters, CreativeParameters};
use crate::arranger::{describe_sections, Arrangement, Section, SectionPlan};
use crate::genres::{ClaveOrientation, GenreConfig};
use crate::pitch::Key;

/// Default creative level when the caller gives none
pub const DEFAULT_CREATIVE_LEVEL: i32 = 50;

/// Caller inputs for one prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptParams {
    pub key: Key,

    /// Beats per minute; `None` uses the midpoint of the genre's range
    pub tempo: Option<u32>,

    pub bars: u32,

    /// Section map; `None` describes the default plan for the bar count
    pub sections: Option<Vec<Section>>,

    /// Free-text direction, e.g. "nostalgic, late night"
    #[serde(default)]
    pub hint: String,

    /// Creative control, 0-100
    pub creative_level: i32,

    /// Clave orientation; `None` describes the genre's own
    #[serde(default)]
    pub clave: Option<ClaveOrientation>,
}

impl PromptParams {
    pub fn new(key: Key, bars: u32) -> Self {
        PromptParams {
            key,
            tempo: None,
            bars,
            sections: None,
            hint: String::new(),
            creative_level: DEFAULT_CREATIVE_LEVEL,
            clave: None,
        }
    }

    /// Params describing an arrangement that was already generated
    pub fn from_arrangement(arrangement: &Arrangement) -> Self {
        PromptParams {
            key: arrangement.key,
            tempo: Some(arrangement.tempo),
            bars: arrangement.bars,
            sections: Some(arrangement.sections.clone()),
            hint: String::new(),
            creative_level: DEFAULT_CREATIVE_LEVEL,
            clave: arrangement.clave,
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

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn with_creative_level(mut self, level: i32) -> Self {
        self.creative_level = level;
        self
    }

    pub fn with_clave(mut self, clave: ClaveOrientation) -> Self {
        self.clave = Some(clave);
        self
    }
}

/// Text and parameters for the external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPrompt {
    /// Full production brief
    pub text: String,

    /// Compact style tag line: hint, genre style, tempo and key
    pub style: String,

    /// Things the renderer should avoid
    pub negative_tags: Vec<String>,

    /// Tempo the prompt was written for
    pub tempo: u32,

    pub parameters: CreativeParameters,
}

/// Compose the renderer prompt for a genre
pub fn compose_prompt(config: &GenreConfig, params: &PromptParams) -> RenderPrompt {
    let tempo = params.tempo.unwrap_or_else(|| config.default_tempo());
    let hint = params.hint.trim();

    let structure = match &params.sections {
        Some(sections) => describe_sections(sections),
        None => SectionPlan::default_for(params.bars).describe(),
    };

    let instruments = config
        .roles
        .iter()
        .map(|b| b.profile.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut text = format!(
        "Generate a {}-bar multitrack arrangement. Genre: {}. Key: {}. BPM: {}. \
         Time signature: {}. Structure: {}. Instruments: {}. ",
        params.bars,
        config.display_name,
        params.key,
        tempo,
        config.time_signature,
        structure,
        instruments
    );

    if let Some(default) = config.clave {
        let clave = params.clave.unwrap_or(default);
        text.push_str(&format!("Clave: {}. ", clave.label()));
    }

    if !hint.is_empty() {
        text.push_str(&format!("Special: {}. ", hint));
    }

    text.push_str(&format!("Avoid: {}.", config.negative_tags.join(", ")));

    let mut style = format!(
        "{}, {} bpm, key of {}",
        config.style_hint,
        tempo,
        params.key.short_name()
    );
    if !hint.is_empty() {
        style = format!("{}, {}", hint, style);
    }

    log::debug!(
        "Composed prompt for {} at {} bpm ({} chars)",
        config.genre,
        tempo,
        text.len()
    );

    RenderPrompt {
        text,
        style,
        negative_tags: config.negative_tags.clone(),
        tempo,
        parameters: creative_parameters(params.creative_level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arranger::SectionKind;
    use crate::genres::Registry;

    fn params() -> PromptParams {
        PromptParams::new(Key::parse("E").unwrap(), 16).with_sections(vec![
            Section::new(SectionKind::Intro, 1, 4, 40, 60),
            Section::new(SectionKind::Verse, 5, 16, 60, 85),
        ])
    }

    #[test]
    fn test_bachata_prompt_text() {
        let registry = Registry::builtin().unwrap();
        let bachata = registry.resolve("bachata").unwrap();

        let prompt = compose_prompt(&bachata, &params().with_tempo(115));
        assert!(prompt.text.starts_with("Generate a 16-bar multitrack arrangement."));
        assert!(prompt.text.contains("Genre: Bachata Romántica."));
        assert!(prompt.text.contains("Key: E major. BPM: 115."));
        assert!(prompt.text.contains("Time signature: 4/4."));
        assert!(prompt.text.contains("Structure: intro (bars 1-4), verse (bars 5-16)."));
        assert!(prompt.text.contains("Requinto"));
        assert!(!prompt.text.contains("Clave:"));
        assert!(!prompt.text.contains("Special:"));
        assert!(prompt.text.ends_with("trap."));
        assert_eq!(prompt.tempo, 115);
    }

    #[test]
    fn test_missing_tempo_uses_genre_midpoint() {
        let registry = Registry::builtin().unwrap();
        let bolero = registry.resolve("bolero").unwrap();

        let prompt = compose_prompt(&bolero, &params());
        assert_eq!(prompt.tempo, bolero.default_tempo());
        assert!(prompt.text.contains(&format!("BPM: {}.", bolero.default_tempo())));
    }

    #[test]
    fn test_salsa_mentions_clave_and_hint() {
        let registry = Registry::builtin().unwrap();
        let salsa = registry.resolve("salsa").unwrap();

        let prompt = compose_prompt(&salsa, &params().with_hint("descarga"));
        assert!(prompt.text.contains("Clave: 2-3."));
        assert!(prompt.text.contains("Special: descarga."));
        assert!(prompt.style.starts_with("descarga, "));
        assert!(prompt.style.ends_with("bpm, key of E"));

        let flipped = compose_prompt(&salsa, &params().with_clave(ClaveOrientation::ThreeTwo));
        assert!(flipped.text.contains("Clave: 3-2."));

        // Genres without a clave ignore the orientation
        let bolero = registry.resolve("bolero").unwrap();
        let prompt = compose_prompt(&bolero, &params().with_clave(ClaveOrientation::ThreeTwo));
        assert!(!prompt.text.contains("Clave:"));
    }

    #[test]
    fn test_blank_hint_is_omitted() {
        let registry = Registry::builtin().unwrap();
        let merengue = registry.resolve("merengue").unwrap();

        let prompt = compose_prompt(&merengue, &params().with_hint("   "));
        assert!(!prompt.text.contains("Special:"));
        assert!(prompt.style.starts_with(&merengue.style_hint));
        assert!(prompt.text.contains("Time signature: 2/4."));
    }

    #[test]
    fn test_default_structure_and_parameters() {
        let registry = Registry::builtin().unwrap();
        let generic = registry.resolve("generic").unwrap();

        let prompt = compose_prompt(
            &generic,
            &PromptParams::new(Key::parse("Am").unwrap(), 8).with_creative_level(85),
        );
        assert!(prompt.text.contains("Structure: intro (bars 1-2), verse (bars 3-8)."));
        assert_eq!(prompt.parameters.level, 85);
        assert_eq!(prompt.parameters.infer_steps, 150);
    }
}
