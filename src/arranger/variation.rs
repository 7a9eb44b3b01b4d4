// Variation - Seeded velocity variation of finished arrangements
// Same seed, same output; pitches and timing are never touched

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::engine::{ArrangeError, Arrangement, ArrangementEngine, ArrangementRequest, NoteEvent};

/// One seeded take of an arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub seed: u64,
    pub arrangement: Arrangement,
}

/// Re-derive every velocity with a seeded jitter in `[-spread, +spread]`
///
/// Tracks are visited in arrangement order and events in generation order,
/// so the jitter sequence depends only on the seed and the event layout.
/// Results stay inside each instrument's velocity range.
pub fn vary(arrangement: &Arrangement, seed: u64, spread: u8) -> Arrangement {
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = spread as i32;

    let mut varied = arrangement.clone();
    for track in &mut varied.tracks {
        let profile = track.profile.clone();
        track.events = track
            .events
            .iter()
            .map(|event| {
                let jitter = rng.gen_range(-spread..=spread);
                NoteEvent {
                    velocity: profile.clamp_velocity(event.velocity as f64 + jitter as f64),
                    ..*event
                }
            })
            .collect();
    }

    varied
}

impl ArrangementEngine {
    /// Arrange once, then produce one variation per seed
    pub fn arrange_variations(
        &self,
        request: &ArrangementRequest,
        seeds: &[u64],
    ) -> Result<Vec<Variation>, ArrangeError> {
        let base = self.arrange(request)?;
        let spread = self.config().variation_spread;

        log::info!("Generating {} variations (spread ±{})", seeds.len(), spread);

        Ok(seeds
            .iter()
            .map(|&seed| Variation {
                seed,
                arrangement: vary(&base, seed, spread),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genres::Registry;
    use crate::pitch::Key;

    fn base() -> Arrangement {
        let engine = ArrangementEngine::new(Registry::builtin().unwrap());
        let request = ArrangementRequest::new("salsa", Key::parse("Am").unwrap(), 8).with_tempo(180);
        engine.arrange(&request).unwrap()
    }

    fn velocities(arrangement: &Arrangement) -> Vec<u8> {
        arrangement
            .tracks
            .iter()
            .flat_map(|t| t.events.iter().map(|e| e.velocity))
            .collect()
    }

    #[test]
    fn test_same_seed_same_output() {
        let base = base();
        assert_eq!(vary(&base, 42, 8), vary(&base, 42, 8));
    }

    #[test]
    fn test_different_seeds_differ() {
        let base = base();
        assert_ne!(velocities(&vary(&base, 1, 8)), velocities(&vary(&base, 2, 8)));
    }

    #[test]
    fn test_zero_spread_is_identity() {
        let base = base();
        assert_eq!(vary(&base, 7, 0), base);
    }

    #[test]
    fn test_variation_keeps_pitch_timing_and_range() {
        let base = base();
        let varied = vary(&base, 99, 20);

        for (a, b) in base.tracks.iter().zip(&varied.tracks) {
            let (lo, hi) = b.profile.velocity_range;
            for (x, y) in a.events.iter().zip(&b.events) {
                assert_eq!((x.pitch, x.start, x.duration), (y.pitch, y.start, y.duration));
                assert!(y.velocity >= lo && y.velocity <= hi);
                assert!((x.velocity as i32 - y.velocity as i32).abs() <= 20);
            }
        }
    }

    #[test]
    fn test_arrange_variations_per_seed() {
        let engine = ArrangementEngine::new(Registry::builtin().unwrap());
        let request = ArrangementRequest::new("merengue", Key::parse("C").unwrap(), 8);
        let variations = engine.arrange_variations(&request, &[10, 11, 12]).unwrap();

        assert_eq!(variations.len(), 3);
        assert_eq!(
            variations.iter().map(|v| v.seed).collect::<Vec<_>>(),
            vec![10, 11, 12]
        );
        assert_ne!(variations[0].arrangement, variations[1].arrangement);
    }
}
