// Run Tracing - Append-only JSONL log of arrangement runs
// One line per stage transition, keyed by run id

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::arranger::Arrangement;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Stage of an arrangement run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Genre lookup and request validation
    Resolve,

    /// Bar-by-bar generation
    Generate,

    /// MIDI serialization
    Export,

    /// Terminal entry, success or failure
    Finish,
}

/// A single trace entry in the run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// RFC 3339 timestamp of when this entry was created
    pub timestamp: String,

    pub run_id: Uuid,

    pub stage: Stage,

    /// Progress fraction [0.0, 1.0]
    pub progress: f32,

    pub message: String,

    /// Optional structured data (event counts, fingerprint, error detail)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Create a new trace entry with current timestamp
    pub fn new(run_id: Uuid, stage: Stage, progress: f32, message: impl Into<String>) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id,
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    /// Attach structured data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Manages an append-only JSONL trace file
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    /// Append one entry, creating the file if needed
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        self.write_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single open
    pub fn write_batch(&self, entries: &[TraceEntry]) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        for entry in entries {
            let json_line = entry.to_json_line()?;
            file.write_all(json_line.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Builds the entries of one run
pub struct RunTrace {
    run_id: Uuid,
}

impl RunTrace {
    /// Start tracing a new run with a fresh id
    pub fn new() -> Self {
        RunTrace {
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn start(&self, stage: Stage, message: impl Into<String>) -> TraceEntry {
        TraceEntry::new(self.run_id, stage, 0.0, message)
    }

    pub fn progress(&self, stage: Stage, progress: f32, message: impl Into<String>) -> TraceEntry {
        TraceEntry::new(self.run_id, stage, progress, message)
    }

    pub fn complete(&self, stage: Stage, message: impl Into<String>) -> TraceEntry {
        TraceEntry::new(self.run_id, stage, 1.0, message)
    }

    /// Terminal entry for a failed run
    pub fn failed(&self, error: &dyn std::fmt::Display) -> TraceEntry {
        TraceEntry::new(self.run_id, Stage::Finish, 1.0, "Run failed")
            .with_data(serde_json::json!({ "error": error.to_string() }))
    }

    /// One entry per generated track, with progress across the track list
    pub fn generation_entries(&self, arrangement: &Arrangement) -> Vec<TraceEntry> {
        let total = arrangement.tracks.len().max(1) as f32;
        arrangement
            .tracks
            .iter()
            .enumerate()
            .map(|(i, track)| {
                self.progress(
                    Stage::Generate,
                    (i + 1) as f32 / total,
                    format!("Generated {}", track.role),
                )
                .with_data(serde_json::json!({
                    "role": track.role,
                    "instrument": track.profile.id,
                    "events": track.events.len(),
                    "end_beat": track.end_beat(),
                }))
            })
            .collect()
    }
}

impl Default for RunTrace {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary data for the terminal entry of a successful run
pub fn arrangement_summary(arrangement: &Arrangement) -> Result<serde_json::Value, TraceError> {
    Ok(serde_json::json!({
        "genre": arrangement.genre,
        "key": arrangement.key.to_string(),
        "tempo": arrangement.tempo,
        "bars": arrangement.bars,
        "tracks": arrangement.tracks.len(),
        "events": arrangement.event_count(),
        "defaults_applied": arrangement.defaults_applied.len(),
        "fingerprint": arrangement.fingerprint()?,
    }))
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in contents.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let entry: TraceEntry = serde_json::from_str(line)?;
        entries.push(entry);
    }

    Ok(entries)
}
