// Prompt Module - Text and parameter bundles for the external audio renderer
// Consumes resolved genre configs; never touches note events

pub mod composer;
pub mod creative;
pub mod lyrics;
pub mod presets;
pub mod renderer;

// Re-export main types
pub use composer::{compose_prompt, PromptParams, RenderPrompt, DEFAULT_CREATIVE_LEVEL};
pub use creative::{creative_parameters, CreativeBand, CreativeParameters, GuidanceType};
pub use lyrics::{format_lyrics, INSTRUMENTAL_TAG};
pub use presets::{preset, preset_or_default, preset_request, PresetError, RenderPreset, PRESETS};
pub use renderer::{
    arrangement_seconds, RenderError, RenderOutcome, RenderRequest, Renderer, MAX_DURATION_SECS,
    VARIATION_LEVELS,
};
