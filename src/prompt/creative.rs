// Creative Control - Map a single 0-100 scalar to renderer parameters
// Four bands, each interpolating guidance, steps and auxiliary coefficients

use serde::{Deserialize, Serialize};

/// Named band of the creative control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeBand {
    /// 0-19: faithful to the genre's conventions
    Tradicional,

    /// 20-49
    Balanceado,

    /// 50-79
    Creativo,

    /// 80-100: loose guidance, longest sampling
    Experimental,
}

impl CreativeBand {
    pub fn for_level(level: i32) -> Self {
        match level.clamp(0, 100) {
            0..=19 => CreativeBand::Tradicional,
            20..=49 => CreativeBand::Balanceado,
            50..=79 => CreativeBand::Creativo,
            _ => CreativeBand::Experimental,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CreativeBand::Tradicional => "Tradicional",
            CreativeBand::Balanceado => "Balanceado",
            CreativeBand::Creativo => "Creativo",
            CreativeBand::Experimental => "Experimental",
        }
    }
}

/// Classifier-free guidance flavour requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceType {
    Apg,
    Cfg,
}

/// Parameter bundle handed to the external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeParameters {
    /// Level after clamping to 0..=100
    pub level: i32,

    pub band: CreativeBand,

    pub guidance_scale: f64,

    pub infer_steps: u32,

    pub omega_scale: f64,

    pub guidance_type: GuidanceType,

    /// Fraction of the diffusion run that receives guidance
    pub guidance_interval: f64,

    pub guidance_interval_decay: f64,

    pub min_guidance_scale: f64,

    pub use_erg_tag: bool,
    pub use_erg_lyric: bool,
    pub use_erg_diffusion: bool,

    /// Optimal-step sampling checkpoints; empty above the balanced band
    pub oss_steps: Vec<u32>,

    pub guidance_scale_text: f64,
    pub guidance_scale_lyric: f64,

    pub scheduler: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Map a creative level to renderer parameters
///
/// Bands:
/// - 0-19: fixed guidance 7.0, omega 5.0, 60 steps
/// - 20-49: guidance 5 -> 8, omega 5 -> 10, 80 steps
/// - 50-79: guidance 8 -> 12, omega 10 -> 13, 100 steps
/// - 80-100: guidance 12 -> 15, omega 13 -> 15, 150 steps, plain CFG above 90
pub fn creative_parameters(level: i32) -> CreativeParameters {
    let level = level.clamp(0, 100);
    let l = level as f64;

    let (guidance_scale, omega_scale, infer_steps, guidance_type) = match level {
        0..=19 => (7.0, 5.0, 60, GuidanceType::Apg),
        20..=49 => {
            let t = (l - 20.0) / 30.0;
            (5.0 + t * 3.0, 5.0 + t * 5.0, 80, GuidanceType::Apg)
        }
        50..=79 => {
            let t = (l - 50.0) / 30.0;
            (8.0 + t * 4.0, 10.0 + t * 3.0, 100, GuidanceType::Apg)
        }
        _ => {
            let t = (l - 80.0) / 20.0;
            let guidance_type = if level > 90 {
                GuidanceType::Cfg
            } else {
                GuidanceType::Apg
            };
            (12.0 + t * 3.0, 13.0 + t * 2.0, 150, guidance_type)
        }
    };

    let use_erg = level < 80;

    CreativeParameters {
        level,
        band: CreativeBand::for_level(level),
        guidance_scale: round2(guidance_scale),
        infer_steps,
        omega_scale: round2(omega_scale),
        guidance_type,
        guidance_interval: round2(0.5 - l / 100.0 * 0.3),
        guidance_interval_decay: 0.0,
        min_guidance_scale: 3.0,
        use_erg_tag: use_erg,
        use_erg_lyric: use_erg,
        use_erg_diffusion: use_erg,
        oss_steps: if level < 50 { vec![60, 80, 100] } else { Vec::new() },
        guidance_scale_text: 0.0,
        guidance_scale_lyric: 0.0,
        scheduler: "euler".to_string(),
    }
}
