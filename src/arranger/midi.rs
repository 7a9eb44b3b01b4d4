// MIDI Export - Convert arrangements to MIDI files using midly crate
// One track per role on the beat axis, plus a meta track for tempo and meter

use midly::{Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::engine::{Arrangement, RoleTrack};
use crate::config::EngineConfig;
use crate::genres::Role;
use crate::groove::TimeSignature;

/// Errors that can occur during MIDI export
#[derive(Debug, Error)]
pub enum MidiExportError {
    #[error("Failed to write MIDI: {0}")]
    Write(String),

    #[error("Arrangement has no track for role '{0}'")]
    UnknownRole(Role),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiExportOptions {
    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ppq: u16,

    /// Include tempo metadata
    pub include_tempo: bool,

    /// Include time signature metadata
    pub include_time_signature: bool,

    /// Include track names
    pub track_names: bool,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: 480,
            include_tempo: true,
            include_time_signature: true,
            track_names: true,
        }
    }
}

impl MidiExportOptions {
    /// Defaults with the PPQ taken from the engine config
    pub fn from_config(config: &EngineConfig) -> Self {
        MidiExportOptions {
            ppq: config.ppq,
            ..Default::default()
        }
    }
}

/// Export every role of an arrangement to MIDI file bytes
///
/// Track 0 carries tempo and time signature; each role follows in
/// arrangement order with its name, program change and notes.
pub fn export_midi(
    arrangement: &Arrangement,
    options: &MidiExportOptions,
) -> Result<Vec<u8>, MidiExportError> {
    let tracks: Vec<&RoleTrack> = arrangement.tracks.iter().collect();
    write_smf(arrangement, &tracks, options)
}

/// Export a single role, with the meta track, to MIDI file bytes
pub fn export_role_midi(
    arrangement: &Arrangement,
    role: Role,
    options: &MidiExportOptions,
) -> Result<Vec<u8>, MidiExportError> {
    let track = arrangement
        .track(role)
        .ok_or(MidiExportError::UnknownRole(role))?;
    write_smf(arrangement, &[track], options)
}

/// Export the arrangement and write it to disk
pub fn save_midi(
    arrangement: &Arrangement,
    path: &Path,
    options: &MidiExportOptions,
) -> Result<(), MidiExportError> {
    let bytes = export_midi(arrangement, options)?;
    std::fs::write(path, bytes)?;
    log::info!("Wrote MIDI for {} roles to {}", arrangement.tracks.len(), path.display());
    Ok(())
}

fn write_smf(
    arrangement: &Arrangement,
    role_tracks: &[&RoleTrack],
    options: &MidiExportOptions,
) -> Result<Vec<u8>, MidiExportError> {
    let header = Header {
        format: midly::Format::Parallel,
        timing: Timing::Metrical(options.ppq.into()),
    };

    let mut tracks = Vec::with_capacity(role_tracks.len() + 1);

    // Track 0: Tempo and time signature metadata
    let mut meta_track = Track::new();
    if options.track_names {
        add_track_name(&mut meta_track, 0, "meta");
    }
    if options.include_tempo {
        add_tempo(&mut meta_track, 0, arrangement.tempo);
    }
    if options.include_time_signature {
        add_time_signature(&mut meta_track, 0, arrangement.time_signature);
    }
    add_end_of_track(&mut meta_track, 0);
    tracks.push(meta_track);

    for role_track in role_tracks {
        tracks.push(create_role_track(role_track, options));
    }

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| MidiExportError::Write(e.to_string()))?;

    Ok(bytes)
}

/// Convert beats to ticks
fn beats_to_ticks(beats: f64, ppq: u16) -> u32 {
    (beats * ppq as f64).round().max(0.0) as u32
}

/// Create a MIDI track for one role
fn create_role_track(role_track: &RoleTrack, options: &MidiExportOptions) -> Track<'static> {
    let channel = role_track.profile.channel;

    // (tick, order, kind): at equal ticks setup comes first, then note-offs, then note-ons
    let mut events: Vec<(u32, u8, TrackEventKind<'static>)> = Vec::new();

    if options.track_names {
        events.push((
            0,
            0,
            TrackEventKind::Meta(MetaMessage::TrackName(role_track.role.name().as_bytes())),
        ));
    }

    if !role_track.profile.is_percussion() {
        events.push((
            0,
            0,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::ProgramChange {
                    program: role_track.profile.program.into(),
                },
            },
        ));
    }

    for note in &role_track.events {
        let tick_on = beats_to_ticks(note.start, options.ppq);
        let tick_off = beats_to_ticks(note.end(), options.ppq).max(tick_on + 1);

        events.push((
            tick_on,
            2,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOn {
                    key: note.pitch.into(),
                    vel: note.velocity.into(),
                },
            },
        ));
        events.push((
            tick_off,
            1,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOff {
                    key: note.pitch.into(),
                    vel: 0.into(),
                },
            },
        ));
    }

    // Stable sort keeps generation order among simultaneous notes
    events.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut track = Track::new();
    let mut last_tick = 0;
    for (tick, _, kind) in events {
        let delta = tick.saturating_sub(last_tick);
        track.push(TrackEvent {
            delta: delta.into(),
            kind,
        });
        last_tick = tick;
    }

    add_end_of_track(&mut track, 0);
    track
}

/// Add track name to track
fn add_track_name<'a>(track: &mut Track<'a>, delta: u32, name: &'a str) {
    track.push(TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    });
}

/// Add tempo meta message
fn add_tempo(track: &mut Track<'_>, delta: u32, bpm: u32) {
    // Microseconds per quarter note
    let us_per_quarter = 60_000_000 / bpm.max(1);

    track.push(TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.into())),
    });
}

/// Add time signature meta message
fn add_time_signature(track: &mut Track<'_>, delta: u32, time_signature: TimeSignature) {
    // Denominator is stored as a power of two
    let denominator = time_signature.denominator.max(1).trailing_zeros() as u8;

    track.push(TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
            time_signature.numerator,
            denominator,
            24,
            8,
        )),
    });
}

/// Add end of track message
fn add_end_of_track(track: &mut Track<'_>, delta: u32) {
    track.push(TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
}
