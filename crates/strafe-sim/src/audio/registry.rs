use std::collections::HashMap;

use serde::Deserialize;

/// The sounds the simulation can request. The host maps each kind to an
/// actual playable asset; the core never loads or decodes anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundKind {
    Shoot,
    Explosion,
    Hit,
    Spawn,
    Pickup,
    GameOver,
}

/// Playable source descriptor for one sound kind.
#[derive(Debug, Clone, Deserialize)]
pub struct SoundDef {
    /// Host-side asset identifier (e.g. a file stem or sprite name).
    pub source: String,
    /// Gain before positional attenuation, in [0, 1].
    #[serde(default = "default_gain")]
    pub base_gain: f32,
    /// Nominal playback length; voices free themselves after this.
    pub duration_ms: f32,
    /// Voice slots reserved for this kind.
    #[serde(default = "default_voices")]
    pub voices: usize,
    /// Priority used when the caller does not supply one.
    #[serde(default)]
    pub priority: u8,
}

fn default_gain() -> f32 {
    1.0
}

fn default_voices() -> usize {
    4
}

/// Registry of sound definitions, loaded from a JSON manifest shipped by
/// the host alongside its assets.
#[derive(Debug, Clone, Default)]
pub struct AudioRegistry {
    sounds: HashMap<SoundKind, SoundDef>,
}

impl AudioRegistry {
    /// Parse a registry from a JSON object keyed by sound kind.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let sounds = serde_json::from_str(json)?;
        Ok(Self { sounds })
    }

    /// Built-in definitions so the sim is audible without a manifest.
    pub fn with_defaults() -> Self {
        let mut sounds = HashMap::new();
        let mut def = |kind, source: &str, duration_ms: f32, voices, priority| {
            sounds.insert(
                kind,
                SoundDef {
                    source: source.to_string(),
                    base_gain: 1.0,
                    duration_ms,
                    voices,
                    priority,
                },
            );
        };
        def(SoundKind::Shoot, "shoot", 150.0, 4, 2);
        def(SoundKind::Explosion, "explosion", 400.0, 4, 5);
        def(SoundKind::Hit, "hit", 200.0, 2, 8);
        def(SoundKind::Spawn, "spawn", 250.0, 2, 1);
        def(SoundKind::Pickup, "pickup", 250.0, 2, 6);
        def(SoundKind::GameOver, "game_over", 1200.0, 1, 10);
        Self { sounds }
    }

    pub fn get(&self, kind: SoundKind) -> Option<&SoundDef> {
        self.sounds.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}
