//! Persistence for the user's session presets and alarm sound.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Database;
use crate::audio::Sound;
use crate::error::CoreError;
use crate::timer::PresetConfig;

const PRESETS_KEY: &str = "presets";
const SOUND_KEY: &str = "sound";

/// Everything the preset store persists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub presets: PresetConfig,
    pub sound: Sound,
}

pub trait PresetStore {
    /// Read the stored preferences. Missing or malformed records fall back
    /// to their defaults independently of each other.
    fn load(&self) -> Preferences;

    /// # Errors
    /// Returns an error if the preferences cannot be written.
    fn save(&mut self, prefs: &Preferences) -> Result<(), CoreError>;
}

/// Store backed by the `kv` table, one record per preference.
pub struct DatabasePresetStore {
    db: Database,
}

impl DatabasePresetStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn load_presets(&self) -> PresetConfig {
        let raw = match self.db.kv_get(PRESETS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return PresetConfig::default(),
            Err(e) => {
                warn!(error = %e, "cannot read stored presets, using defaults");
                return PresetConfig::default();
            }
        };
        match serde_json::from_str::<PresetConfig>(&raw) {
            Ok(presets) => match presets.validate() {
                Ok(()) => presets,
                Err(e) => {
                    warn!(error = %e, "stored presets out of range, using defaults");
                    PresetConfig::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "stored presets malformed, using defaults");
                PresetConfig::default()
            }
        }
    }

    fn load_sound(&self) -> Sound {
        match self.db.kv_get(SOUND_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Sound>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "stored sound malformed, using default");
                Sound::default()
            }),
            Ok(None) => Sound::default(),
            Err(e) => {
                warn!(error = %e, "cannot read stored sound, using default");
                Sound::default()
            }
        }
    }
}

impl PresetStore for DatabasePresetStore {
    fn load(&self) -> Preferences {
        Preferences {
            presets: self.load_presets(),
            sound: self.load_sound(),
        }
    }

    fn save(&mut self, prefs: &Preferences) -> Result<(), CoreError> {
        self.db
            .kv_set(PRESETS_KEY, &serde_json::to_string(&prefs.presets)?)?;
        self.db
            .kv_set(SOUND_KEY, &serde_json::to_string(&prefs.sound)?)?;
        Ok(())
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryPresetStore {
    saved: Option<Preferences>,
    saves: usize,
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(prefs: Preferences) -> Self {
        Self {
            saved: Some(prefs),
            saves: 0,
        }
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl PresetStore for MemoryPresetStore {
    fn load(&self) -> Preferences {
        self.saved.unwrap_or_default()
    }

    fn save(&mut self, prefs: &Preferences) -> Result<(), CoreError> {
        self.saved = Some(*prefs);
        self.saves += 1;
        Ok(())
    }
}
