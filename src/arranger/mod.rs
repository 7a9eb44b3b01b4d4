// Arranger - Genre-driven musical arrangement
// Turns a request (genre, key, tempo, sections) into per-role note tracks

pub mod engine;
pub mod midi;
pub mod section;
pub mod variation;

// Re-export main types
pub use engine::{
    ArrangeError, Arrangement, ArrangementEngine, ArrangementRequest, NoteEvent, RoleTrack,
};
pub use midi::{export_midi, export_role_midi, save_midi, MidiExportError, MidiExportOptions};
pub use section::{
    describe_sections, validate_sections, Section, SectionKind, SectionPlan, ValidationError,
};
pub use variation::{vary, Variation};
