//! Alarm sound registry and playback.
//!
//! Playback is strictly best-effort: every [`AudioPlayer`] call returns a
//! [`Result`] so the caller can log it, and callers in this crate never let a
//! failure interrupt the timer.

mod command;
#[cfg(feature = "rodio")]
mod rodio_player;

pub use command::CommandPlayer;
#[cfg(feature = "rodio")]
pub use rodio_player::RodioPlayer;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AudioError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    #[default]
    DigitalAlarm,
    EggTimer,
}

impl Sound {
    pub const ALL: [Sound; 2] = [Sound::DigitalAlarm, Sound::EggTimer];

    pub fn key(self) -> &'static str {
        match self {
            Sound::DigitalAlarm => "digital_alarm",
            Sound::EggTimer => "egg_timer",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sound::DigitalAlarm => "Digital Alarm",
            Sound::EggTimer => "Egg Timer",
        }
    }

    /// Asset file name inside the sounds directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Sound::DigitalAlarm => "digitalAlarm.ogg",
            Sound::EggTimer => "eggTimer.ogg",
        }
    }

    pub fn asset_path(self, sounds_dir: &Path) -> PathBuf {
        sounds_dir.join(self.file_name())
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Sound {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(&['-', '_', ' '][..], "");
        match normalized.as_str() {
            "digitalalarm" | "alarm" => Ok(Sound::DigitalAlarm),
            "eggtimer" | "egg" => Ok(Sound::EggTimer),
            _ => Err(ValidationError::UnknownSound(s.to_string())),
        }
    }
}

/// Playback volume in percent, clamped to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Volume(u8);

impl Volume {
    /// Completion alerts.
    pub const FULL: Volume = Volume(100);
    /// Sound previews in the settings dialog.
    pub const PREVIEW: Volume = Volume(50);

    pub fn new(percent: u32) -> Self {
        Volume(percent.min(100) as u8)
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

pub trait AudioPlayer {
    /// Play `sound` once to the end, detached from the caller.
    fn play(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError>;

    /// Play `sound` as the current preview, replacing any preview in flight.
    fn preview(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError>;

    /// Stop and discard the current preview, if any.
    fn stop_preview(&mut self);
}

/// Player that never makes a sound. Used when audio is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&mut self, _sound: Sound, _volume: Volume) -> Result<(), AudioError> {
        Ok(())
    }

    fn preview(&mut self, _sound: Sound, _volume: Volume) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop_preview(&mut self) {}
}

impl<P: AudioPlayer + ?Sized> AudioPlayer for Box<P> {
    fn play(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError> {
        (**self).play(sound, volume)
    }

    fn preview(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError> {
        (**self).preview(sound, volume)
    }

    fn stop_preview(&mut self) {
        (**self).stop_preview()
    }
}

/// Resolve an asset on disk, failing with [`AudioError::MissingAsset`].
pub(crate) fn existing_asset(sound: Sound, sounds_dir: &Path) -> Result<PathBuf, AudioError> {
    let path = sound.asset_path(sounds_dir);
    if path.is_file() {
        Ok(path)
    } else {
        Err(AudioError::MissingAsset(path))
    }
}
