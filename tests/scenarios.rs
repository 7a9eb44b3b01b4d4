// End-to-end arrangement scenarios
// Exercise the public API the way an embedding application would

use std::sync::Arc;
use std::thread;

use ritmo::arranger::{
    export_midi, ArrangeError, Arrangement, ArrangementEngine, ArrangementRequest,
    MidiExportOptions, Section, SectionKind, ValidationError,
};
use ritmo::catalog::ConfigurationError;
use ritmo::genres::{ClaveOrientation, Genre, Registry, Role};
use ritmo::pitch::{build_chord, parse_chord, Key};
use ritmo::prompt::{compose_prompt, PromptParams};
use ritmo::EngineConfig;

fn engine() -> ArrangementEngine {
    ArrangementEngine::new(Registry::builtin().unwrap())
}

fn bachata_request() -> ArrangementRequest {
    ArrangementRequest::new("bachata", Key::parse("E").unwrap(), 16)
        .with_tempo(115)
        .with_sections(vec![
            Section::new(SectionKind::Intro, 1, 4, 40, 60),
            Section::new(SectionKind::Verse, 5, 9, 60, 85),
            Section::new(SectionKind::Solo, 10, 14, 85, 115),
            Section::new(SectionKind::Resolution, 15, 16, 95, 100),
        ])
}

/// Events of a role that start inside a 1-based bar
fn events_in_bar(arrangement: &Arrangement, role: Role, bar: u32) -> usize {
    let bpb = arrangement.beats_per_bar();
    let (lo, hi) = ((bar - 1) as f64 * bpb, bar as f64 * bpb);
    arrangement
        .track(role)
        .map(|t| t.events.iter().filter(|e| e.start >= lo && e.start < hi).count())
        .unwrap_or(0)
}

#[test]
fn test_bachata_scenario() {
    let arrangement = engine().arrange(&bachata_request()).unwrap();

    assert_eq!(arrangement.genre, Genre::Bachata);
    assert_eq!(arrangement.total_beats(), 64.0);
    assert!(arrangement.defaults_applied.is_empty());

    let lead = arrangement.track(Role::Lead).unwrap();
    assert_eq!(lead.profile.id, "requinto");
    assert_eq!(lead.events.first().unwrap().start, 0.0);
    assert!(lead.events.iter().all(|e| (0.0..64.0).contains(&e.start)));
    assert_eq!(lead.end_beat(), 64.0);

    for section in &arrangement.sections {
        let lo = (section.start - 1) as f64 * 4.0;
        let hi = section.end as f64 * 4.0;
        let starts: Vec<f64> = lead
            .events
            .iter()
            .map(|e| e.start)
            .filter(|s| *s >= lo && *s < hi)
            .collect();
        assert!(!starts.is_empty(), "no lead notes in {:?}", section.kind);
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_unknown_genre_fails_before_output() {
    let request = ArrangementRequest::new("tango", Key::parse("Am").unwrap(), 8);
    let err = engine().arrange(&request).unwrap_err();
    assert_eq!(
        err,
        ArrangeError::Configuration(ConfigurationError::UnknownGenre("tango".to_string()))
    );
}

#[test]
fn test_section_gap_names_the_bar() {
    let request = ArrangementRequest::new("bachata", Key::parse("E").unwrap(), 10).with_sections(
        vec![
            Section::new(SectionKind::Intro, 1, 4, 40, 60),
            Section::new(SectionKind::Verse, 6, 10, 60, 85),
        ],
    );

    let err = engine().arrange(&request).unwrap_err();
    assert_eq!(
        err,
        ArrangeError::Validation(ValidationError::UncoveredBar { bar: 5 })
    );
    assert!(err.to_string().contains('5'));
}

#[test]
fn test_identical_requests_are_byte_identical() {
    let engine = engine();
    let first = engine.arrange(&bachata_request()).unwrap();
    let second = engine.arrange(&bachata_request()).unwrap();

    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());

    let options = MidiExportOptions::default();
    assert_eq!(
        export_midi(&first, &options).unwrap(),
        export_midi(&second, &options).unwrap()
    );
}

#[test]
fn test_every_velocity_inside_profile_range() {
    let engine = engine();
    for genre in Genre::ALL {
        let request = ArrangementRequest::new(genre.id(), Key::parse("G").unwrap(), 32);
        let arrangement = engine.arrange(&request).unwrap();

        for track in &arrangement.tracks {
            let (lo, hi) = track.profile.velocity_range;
            for event in &track.events {
                assert!(
                    (lo..=hi).contains(&event.velocity),
                    "{} {} velocity {} outside {}-{}",
                    genre,
                    track.role,
                    event.velocity,
                    lo,
                    hi
                );
                assert!(event.pitch <= 127);
            }
        }
    }
}

#[test]
fn test_pattern_density_is_independent_of_length() {
    let engine = engine();
    let short = engine.arrange(&bachata_request()).unwrap();
    let long = engine
        .arrange(&ArrangementRequest::new("bachata", Key::parse("E").unwrap(), 32))
        .unwrap();

    // Derecho strum: 12 onsets voiced as triads, in a verse bar of both plans
    assert_eq!(events_in_bar(&short, Role::Rhythm, 6), 36);
    assert_eq!(events_in_bar(&long, Role::Rhythm, 6), 36);

    // Eighth-note güira
    assert_eq!(events_in_bar(&short, Role::Percussion2, 6), 8);
    assert_eq!(events_in_bar(&long, Role::Percussion2, 6), 8);
}

#[test]
fn test_two_bar_clave_alternates() {
    let arrangement = engine()
        .arrange(&ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8))
        .unwrap();

    let per_bar: Vec<usize> = (1..=8)
        .map(|bar| events_in_bar(&arrangement, Role::Clave, bar))
        .collect();
    assert_eq!(per_bar, vec![2, 3, 2, 3, 2, 3, 2, 3]);
}

#[test]
fn test_three_two_clave_run() {
    let request = ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8)
        .with_clave(ClaveOrientation::ThreeTwo);
    let arrangement = engine().arrange(&request).unwrap();

    let per_bar: Vec<usize> = (1..=8)
        .map(|bar| events_in_bar(&arrangement, Role::Clave, bar))
        .collect();
    assert_eq!(per_bar, vec![3, 2, 3, 2, 3, 2, 3, 2]);

    let salsa = engine().registry().resolve("salsa").unwrap();
    let prompt = compose_prompt(&salsa, &PromptParams::from_arrangement(&arrangement));
    assert!(prompt.text.contains("Clave: 3-2."));
}

#[test]
fn test_minor_key_bachata_stays_in_one_mode() {
    let arrangement = engine()
        .arrange(&ArrangementRequest::new("bachata", Key::parse("Am").unwrap(), 16))
        .unwrap();

    let a_major = [9u8, 11, 1, 2, 4, 6, 8];
    for role in [Role::Lead, Role::Rhythm, Role::Bass] {
        let track = arrangement.track(role).unwrap();
        assert!(
            track.events.iter().all(|e| a_major.contains(&(e.pitch % 12))),
            "{} leaves A major",
            role
        );
    }
}

#[test]
fn test_overrides_stop_at_section_boundaries() {
    let arrangement = engine().arrange(&bachata_request()).unwrap();

    // Güira rests through the intro and doubles up only in the solo
    for bar in 1..=4 {
        assert_eq!(events_in_bar(&arrangement, Role::Percussion2, bar), 0);
    }
    assert_eq!(events_in_bar(&arrangement, Role::Percussion2, 5), 8);
    assert_eq!(events_in_bar(&arrangement, Role::Percussion2, 9), 8);
    assert_eq!(events_in_bar(&arrangement, Role::Percussion2, 10), 16);
    assert_eq!(events_in_bar(&arrangement, Role::Percussion2, 14), 16);
    assert_eq!(events_in_bar(&arrangement, Role::Percussion2, 15), 8);

    // Segunda holds one bass-register root per solo bar
    for bar in 10..=14 {
        assert_eq!(events_in_bar(&arrangement, Role::Rhythm, bar), 1);
    }
    assert_eq!(events_in_bar(&arrangement, Role::Rhythm, 15), 36);
}

#[test]
fn test_chord_transposition_law() {
    let config = EngineConfig::default();
    let pairs = [("C", "D", 2), ("Am", "Bm", 2), ("G7", "A7", 2), ("E", "F", 1)];

    for (from, to, semitones) in pairs {
        let a = build_chord(parse_chord(from).unwrap().symbol, 3, &config).unwrap();
        let b = build_chord(parse_chord(to).unwrap().symbol, 3, &config).unwrap();
        let shifted: Vec<u8> = a.pitches.iter().map(|p| p + semitones).collect();
        assert_eq!(b.pitches, shifted, "{} -> {}", from, to);
    }
}

#[test]
fn test_variations_differ_by_seed_only() {
    let engine = engine();
    let variations = engine
        .arrange_variations(&bachata_request(), &[7, 8, 7])
        .unwrap();

    assert_eq!(variations[0].arrangement, variations[2].arrangement);
    assert_ne!(variations[0].arrangement, variations[1].arrangement);

    let base = engine.arrange(&bachata_request()).unwrap();
    for variation in &variations {
        for (a, b) in base.tracks.iter().zip(&variation.arrangement.tracks) {
            let timing = |t: &ritmo::RoleTrack| -> Vec<(u8, f64)> {
                t.events.iter().map(|e| (e.pitch, e.start)).collect()
            };
            assert_eq!(timing(a), timing(b));
        }
    }
}

#[test]
fn test_parallel_runs_share_one_engine() {
    let engine = Arc::new(engine());
    let expected = engine.arrange(&bachata_request()).unwrap().fingerprint().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.arrange(&bachata_request()).unwrap().fingerprint().unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_prompt_describes_the_arrangement() {
    let engine = engine();
    let arrangement = engine.arrange(&bachata_request()).unwrap();
    let bachata = engine.registry().resolve("bachata").unwrap();

    let prompt = compose_prompt(&bachata, &PromptParams::from_arrangement(&arrangement));
    assert!(prompt.text.contains("16-bar"));
    assert!(prompt.text.contains("BPM: 115."));
    assert!(prompt
        .text
        .contains("intro (bars 1-4), verse (bars 5-9), solo (bars 10-14), resolution (bars 15-16)"));
}
