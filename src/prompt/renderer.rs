// Renderer Seam - Request and outcome types for the external audio renderer
// The crate ships no network client; callers implement `Renderer`

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use super::composer::{compose_prompt, PromptParams, RenderPrompt};
use super::creative::{creative_parameters, CreativeParameters};
use super::lyrics::format_lyrics;
use crate::genres::GenreConfig;

/// Longest audio the renderer accepts, in seconds
pub const MAX_DURATION_SECS: f64 = 240.0;

/// Creative levels used for a batch of variations
pub const VARIATION_LEVELS: [i32; 3] = [25, 50, 75];

/// Failures reported by a renderer implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    #[error("Render failed: {0}")]
    Failed(String),
}

/// One job for the external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub job_id: Uuid,

    /// RFC 3339 creation time
    pub created_at: String,

    pub prompt: RenderPrompt,

    /// Tagged lyrics block, `[instrumental]` when empty
    pub lyrics: String,

    /// Requested audio length, capped at `MAX_DURATION_SECS`
    pub duration_secs: f64,

    pub seed: u64,
}

impl RenderRequest {
    /// Wrap a composed prompt with a fresh job id and random seed
    pub fn new(prompt: RenderPrompt, lyrics: &str, duration_secs: f64) -> Self {
        RenderRequest {
            job_id: Uuid::new_v4(),
            created_at: chrono::Utc::now().to_rfc3339(),
            prompt,
            lyrics: format_lyrics(lyrics),
            duration_secs: duration_secs.clamp(0.0, MAX_DURATION_SECS),
            seed: rand::thread_rng().gen_range(1..=999_999),
        }
    }

    /// Compose the prompt and derive the duration from bars, meter and tempo
    ///
    /// An explicit `duration_secs` wins over the derived length.
    pub fn compose(
        config: &GenreConfig,
        params: &PromptParams,
        lyrics: &str,
        duration_secs: Option<f64>,
    ) -> Self {
        let prompt = compose_prompt(config, params);
        let duration = duration_secs.unwrap_or_else(|| {
            arrangement_seconds(params.bars, config.beats_per_bar(), prompt.tempo)
        });
        Self::new(prompt, lyrics, duration)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn parameters(&self) -> &CreativeParameters {
        &self.prompt.parameters
    }

    /// Same prompt at creative levels 25, 50 and 75 with consecutive seeds
    pub fn variations(&self) -> Vec<RenderRequest> {
        VARIATION_LEVELS
            .iter()
            .zip(0u64..)
            .map(|(level, i)| {
                let mut prompt = self.prompt.clone();
                prompt.parameters = creative_parameters(*level);
                RenderRequest {
                    job_id: Uuid::new_v4(),
                    created_at: chrono::Utc::now().to_rfc3339(),
                    prompt,
                    lyrics: self.lyrics.clone(),
                    duration_secs: self.duration_secs,
                    seed: self.seed.wrapping_add(i),
                }
            })
            .collect()
    }
}

/// Length of `bars` bars in seconds at `bpm`
pub fn arrangement_seconds(bars: u32, beats_per_bar: f64, bpm: u32) -> f64 {
    bars as f64 * beats_per_bar * 60.0 / bpm.max(1) as f64
}

/// What came back from the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    Success {
        job_id: Uuid,
        audio_path: PathBuf,
        duration_secs: f64,
        seed: u64,
    },
    Failure {
        job_id: Uuid,
        error: String,
    },
}

impl RenderOutcome {
    /// Build an outcome from a renderer result
    pub fn from_result(request: &RenderRequest, result: Result<PathBuf, RenderError>) -> Self {
        match result {
            Ok(audio_path) => RenderOutcome::Success {
                job_id: request.job_id,
                audio_path,
                duration_secs: request.duration_secs,
                seed: request.seed,
            },
            Err(e) => {
                log::warn!("Render job {} failed: {}", request.job_id, e);
                RenderOutcome::Failure {
                    job_id: request.job_id,
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn job_id(&self) -> Uuid {
        match self {
            RenderOutcome::Success { job_id, .. } | RenderOutcome::Failure { job_id, .. } => *job_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RenderOutcome::Success { .. })
    }
}

/// External audio renderer
pub trait Renderer {
    /// Render one request to an audio file
    fn render(&self, request: &RenderRequest) -> Result<PathBuf, RenderError>;

    /// Render every request independently; one failure never stops the rest
    fn render_batch(&self, requests: &[RenderRequest]) -> Vec<RenderOutcome> {
        requests
            .iter()
            .map(|request| RenderOutcome::from_result(request, self.render(request)))
            .collect()
    }
}
