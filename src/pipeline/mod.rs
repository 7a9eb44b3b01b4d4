// Pipeline Module - Traced arrangement runs with optional MIDI output
// The engine stays I/O free; this is the layer that touches the filesystem

pub mod trace;

use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::arranger::{
    save_midi, ArrangeError, Arrangement, ArrangementEngine, ArrangementRequest,
    MidiExportError, MidiExportOptions,
};
use trace::{arrangement_summary, RunTrace, Stage, TraceError, TraceWriter};

/// Trace file name inside a run directory
pub const TRACE_FILE: &str = "trace.jsonl";

/// MIDI file name inside a run directory
pub const MIDI_FILE: &str = "arrangement.mid";

/// Errors from a traced run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Arrangement failed: {0}")]
    Arrange(#[from] ArrangeError),

    #[error("MIDI export failed: {0}")]
    Midi(#[from] MidiExportError),

    #[error("Trace failed: {0}")]
    Trace(#[from] TraceError),
}

/// Result of a traced run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub arrangement: Arrangement,
    pub trace_path: PathBuf,
    pub midi_path: Option<PathBuf>,
}

/// Arrange a request, tracing each stage into `out_dir`
///
/// When `export_midi` is set the arrangement is also written as
/// `arrangement.mid`. A failed run still leaves a terminal trace entry.
pub fn run_traced(
    engine: &ArrangementEngine,
    request: &ArrangementRequest,
    out_dir: &Path,
    export_midi: bool,
) -> Result<RunOutput, PipelineError> {
    std::fs::create_dir_all(out_dir).map_err(TraceError::from)?;

    let writer = TraceWriter::new(out_dir.join(TRACE_FILE));
    let trace = RunTrace::new();

    writer.write(&trace.start(
        Stage::Resolve,
        format!("Arranging {} bars of {}", request.bars, request.genre),
    ))?;

    let arrangement = match engine.arrange(request) {
        Ok(arrangement) => arrangement,
        Err(e) => {
            log::error!("Run {} failed: {}", trace.run_id(), e);
            writer.write(&trace.failed(&e))?;
            return Err(e.into());
        }
    };

    writer.write_batch(&trace.generation_entries(&arrangement))?;

    let midi_path = if export_midi {
        let path = out_dir.join(MIDI_FILE);
        writer.write(&trace.start(Stage::Export, "Writing MIDI"))?;
        let options = MidiExportOptions::from_config(engine.config());
        if let Err(e) = save_midi(&arrangement, &path, &options) {
            writer.write(&trace.failed(&e))?;
            return Err(e.into());
        }
        writer.write(&trace.complete(Stage::Export, format!("Wrote {}", path.display())))?;
        Some(path)
    } else {
        None
    };

    writer.write(
        &trace
            .complete(Stage::Finish, "Run complete")
            .with_data(arrangement_summary(&arrangement)?),
    )?;

    log::info!(
        "Run {} complete: {} events across {} tracks",
        trace.run_id(),
        arrangement.event_count(),
        arrangement.tracks.len()
    );

    Ok(RunOutput {
        run_id: trace.run_id(),
        arrangement,
        trace_path: writer.path().to_path_buf(),
        midi_path,
    })
}

// Re-export main types
pub use trace::{read_trace_file, TraceEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genres::Registry;
    use crate::pitch::Key;
    use tempfile::TempDir;

    fn engine() -> ArrangementEngine {
        ArrangementEngine::new(Registry::builtin().unwrap())
    }

    #[test]
    fn test_run_writes_trace_and_midi() {
        let temp_dir = TempDir::new().unwrap();
        let request = ArrangementRequest::new("bolero", Key::parse("Dm").unwrap(), 8);

        let output = run_traced(&engine(), &request, temp_dir.path(), true).unwrap();
        assert!(output.midi_path.as_ref().unwrap().exists());

        let entries = read_trace_file(&output.trace_path).unwrap();
        assert!(entries.iter().all(|e| e.run_id == output.run_id));
        assert_eq!(entries[0].stage, Stage::Resolve);

        let last = entries.last().unwrap();
        assert_eq!(last.stage, Stage::Finish);
        assert_eq!(
            last.data.as_ref().unwrap()["events"],
            output.arrangement.event_count()
        );
    }

    #[test]
    fn test_failed_run_leaves_terminal_entry() {
        let temp_dir = TempDir::new().unwrap();
        let request = ArrangementRequest::new("tango", Key::parse("Am").unwrap(), 8);

        let err = run_traced(&engine(), &request, temp_dir.path(), false).unwrap_err();
        assert!(matches!(err, PipelineError::Arrange(ArrangeError::Configuration(_))));

        let entries = read_trace_file(&temp_dir.path().join(TRACE_FILE)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].stage, Stage::Finish);
        assert!(!temp_dir.path().join(MIDI_FILE).exists());
    }
}
