// Instrument Catalog - Immutable instrument profiles keyed by id
// Channel/program follow General MIDI; channel 9 is the percussion channel

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::ConfigurationError;

/// General MIDI percussion channel (0-indexed)
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Sonic identity of one instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Catalog id (e.g., "requinto")
    pub id: String,

    /// Display name
    pub name: String,

    /// MIDI output channel (0-15)
    pub channel: u8,

    /// General MIDI program number
    pub program: u8,

    /// Frequency band to emphasise in the mix, in Hz (advisory only)
    pub frequency_focus: (u32, u32),

    /// Allowed velocity range (min, max)
    pub velocity_range: (u8, u8),

    /// Playing techniques this instrument is known for
    pub articulations: Vec<String>,
}

impl InstrumentProfile {
    /// Round a target velocity and clamp it into this instrument's range
    pub fn clamp_velocity(&self, velocity: f64) -> u8 {
        let (min, max) = self.velocity_range;
        let rounded = velocity.round().clamp(0.0, 127.0) as u8;
        rounded.clamp(min, max)
    }

    /// Whether this instrument plays on the percussion channel
    pub fn is_percussion(&self) -> bool {
        self.channel == PERCUSSION_CHANNEL
    }
}

fn profile(
    id: &str,
    name: &str,
    program: u8,
    channel: u8,
    frequency_focus: (u32, u32),
    velocity_range: (u8, u8),
    articulations: &[&str],
) -> InstrumentProfile {
    InstrumentProfile {
        id: id.to_string(),
        name: name.to_string(),
        channel,
        program,
        frequency_focus,
        velocity_range,
        articulations: articulations.iter().map(|a| a.to_string()).collect(),
    }
}

/// Read-only registry of instrument profiles
#[derive(Debug, Clone, Default)]
pub struct InstrumentCatalog {
    profiles: BTreeMap<String, Arc<InstrumentProfile>>,
}

impl InstrumentCatalog {
    /// Build a catalog from profiles, rejecting inverted velocity ranges
    pub fn from_profiles(profiles: Vec<InstrumentProfile>) -> Result<Self, ConfigurationError> {
        let mut catalog = InstrumentCatalog::default();
        for p in profiles {
            let (min, max) = p.velocity_range;
            if min > max || max > 127 || p.channel > 15 || p.program > 127 {
                return Err(ConfigurationError::InvalidInstrument {
                    instrument: p.id.clone(),
                    reason: format!(
                        "channel {} program {} velocity {}..={}",
                        p.channel, p.program, min, max
                    ),
                });
            }
            catalog.profiles.insert(p.id.clone(), Arc::new(p));
        }
        Ok(catalog)
    }

    /// Look up a profile by id
    pub fn get(&self, id: &str) -> Result<Arc<InstrumentProfile>, ConfigurationError> {
        self.profiles
            .get(id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownInstrument(id.to_string()))
    }

    /// All instrument ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// The built-in instrument set
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_profiles(vec![
            // Bachata / bolero
            profile(
                "requinto",
                "Requinto Guitar",
                24,
                0,
                (2000, 5000),
                (40, 115),
                &["vibrato", "picado", "mordente", "arpeggio", "tremolo"],
            ),
            profile(
                "segunda_guitarra",
                "Segunda Guitar",
                24,
                1,
                (200, 2000),
                (45, 100),
                &["rasgueado", "derecho", "arpegio", "staccato"],
            ),
            profile(
                "bongo",
                "Bongo",
                0,
                PERCUSSION_CHANNEL,
                (200, 2000),
                (35, 110),
                &["martillo", "abierto", "cerrado", "slap"],
            ),
            profile(
                "guira_bachata",
                "Güira (Bachata)",
                0,
                PERCUSSION_CHANNEL,
                (5000, 12000),
                (50, 100),
                &["scrape", "accent", "roll"],
            ),
            profile(
                "bajo_bachata",
                "Bass (Bachata)",
                32,
                2,
                (60, 250),
                (60, 100),
                &["fingered", "muted", "slide"],
            ),
            profile(
                "strings",
                "String Section",
                48,
                3,
                (200, 6000),
                (40, 95),
                &["legato", "tremolo", "swell"],
            ),
            // Salsa
            profile(
                "piano_montuno",
                "Piano (Montuno)",
                0,
                0,
                (250, 4000),
                (60, 120),
                &["montuno", "guajeo", "tumbao", "block_chords"],
            ),
            profile(
                "bajo_tumbao",
                "Bass (Tumbao)",
                32,
                1,
                (40, 200),
                (70, 110),
                &["tumbao", "anticipated", "syncopated"],
            ),
            profile(
                "congas",
                "Congas",
                0,
                PERCUSSION_CHANNEL,
                (150, 3000),
                (50, 120),
                &["tumbao", "open", "slap", "muted", "heel_toe"],
            ),
            profile(
                "timbal",
                "Timbales",
                0,
                PERCUSSION_CHANNEL,
                (500, 8000),
                (60, 127),
                &["cascara", "campana", "paila", "abanico"],
            ),
            profile(
                "trombone_section",
                "Trombone Section",
                57,
                3,
                (80, 3000),
                (50, 115),
                &["legato", "staccato", "sforzando", "mambo"],
            ),
            profile(
                "clave",
                "Claves",
                0,
                PERCUSSION_CHANNEL,
                (1000, 4000),
                (70, 100),
                &["2-3", "3-2"],
            ),
            // Merengue
            profile(
                "tambora",
                "Tambora",
                0,
                PERCUSSION_CHANNEL,
                (60, 500),
                (70, 127),
                &["open", "muted", "rim", "gallop"],
            ),
            profile(
                "guira_merengue",
                "Güira (Merengue)",
                0,
                PERCUSSION_CHANNEL,
                (6000, 15000),
                (70, 115),
                &["fast_scrape", "accent", "roll", "syncopated"],
            ),
            profile(
                "saxo_section",
                "Saxophone Section",
                65,
                4,
                (200, 6000),
                (55, 120),
                &["mambo", "legato", "staccato", "growl"],
            ),
            profile(
                "piano_merengue",
                "Piano (Merengue)",
                0,
                0,
                (300, 4000),
                (70, 120),
                &["guajeo", "block_chords", "octaves"],
            ),
            // Generic pop
            profile(
                "drums",
                "Drum Kit",
                0,
                PERCUSSION_CHANNEL,
                (40, 12000),
                (50, 127),
                &["straight", "shuffle", "half_time", "fills"],
            ),
            profile(
                "electric_bass",
                "Electric Bass",
                33,
                1,
                (40, 400),
                (60, 110),
                &["fingered", "picked", "slap", "muted"],
            ),
            profile(
                "keyboards",
                "Keyboards/Synth",
                4,
                0,
                (100, 8000),
                (50, 110),
                &["pad", "stab", "arpeggio", "lead"],
            ),
            profile(
                "electric_guitar",
                "Electric Guitar",
                27,
                2,
                (200, 6000),
                (45, 115),
                &["clean", "palm_mute", "power_chord", "arpeggio"],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_lookup() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let requinto = catalog.get("requinto").unwrap();
        assert_eq!(requinto.name, "Requinto Guitar");
        assert_eq!(requinto.program, 24);
        assert_eq!(requinto.velocity_range, (40, 115));
        assert!(!requinto.is_percussion());

        assert!(catalog.get("bongo").unwrap().is_percussion());
        assert_eq!(catalog.len(), 20);
    }

    #[test]
    fn test_unknown_instrument_fails() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        assert_eq!(
            catalog.get("theremin").unwrap_err(),
            ConfigurationError::UnknownInstrument("theremin".to_string())
        );
    }

    #[test]
    fn test_shared_profiles_are_the_same_allocation() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let a = catalog.get("bajo_bachata").unwrap();
        let b = catalog.get("bajo_bachata").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_clamp_velocity() {
        let catalog = InstrumentCatalog::builtin().unwrap();
        let bass = catalog.get("bajo_bachata").unwrap();
        assert_eq!(bass.clamp_velocity(20.0), 60);
        assert_eq!(bass.clamp_velocity(80.4), 80);
        assert_eq!(bass.clamp_velocity(80.5), 81);
        assert_eq!(bass.clamp_velocity(300.0), 100);
    }

    #[test]
    fn test_inverted_velocity_range_rejected() {
        let mut bad = profile("bad", "Bad", 0, 0, (0, 0), (90, 10), &[]);
        bad.velocity_range = (90, 10);
        assert!(matches!(
            InstrumentCatalog::from_profiles(vec![bad]),
            Err(ConfigurationError::InvalidInstrument { .. })
        ));
    }
}
