// Ritmo - Genre-aware arrangement engine for Latin dance music
// Module declarations

pub mod arranger;
pub mod catalog;
pub mod config;
pub mod genres;
pub mod groove;
pub mod pipeline;
pub mod pitch;
pub mod prompt;

// Re-export main types
pub use arranger::{
    export_midi, ArrangeError, Arrangement, ArrangementEngine, ArrangementRequest, NoteEvent,
    RoleTrack, Section, SectionKind, ValidationError,
};
pub use catalog::ConfigurationError;
pub use config::{ConfigError, EngineConfig, PitchPolicy};
pub use genres::{Genre, GenreConfig, Registry, Role};
pub use pitch::{Key, PitchError};
pub use prompt::{compose_prompt, creative_parameters, format_lyrics, PromptParams, RenderPrompt};
