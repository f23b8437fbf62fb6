//! Playback by spawning the platform's command-line audio player.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tracing::debug;

use super::{existing_asset, AudioPlayer, Sound, Volume};
use crate::error::AudioError;

/// Audio player that shells out to `paplay`/`ffplay` (Linux and BSDs) or
/// `afplay` (macOS).
///
/// Detached alerts are reaped on a helper thread; the preview child is kept
/// so it can be killed when the preview changes or the player is dropped.
#[derive(Debug)]
pub struct CommandPlayer {
    sounds_dir: PathBuf,
    preview: Option<Child>,
}

impl CommandPlayer {
    pub fn new(sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            sounds_dir: sounds_dir.into(),
            preview: None,
        }
    }

    pub fn sounds_dir(&self) -> &Path {
        &self.sounds_dir
    }

    fn spawn(&self, sound: Sound, volume: Volume) -> Result<Child, AudioError> {
        let path = existing_asset(sound, &self.sounds_dir)?;
        let candidates = player_commands(&path, volume);
        if candidates.is_empty() {
            return Err(AudioError::Unavailable(std::env::consts::OS.to_string()));
        }

        for mut command in candidates {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
            match command.spawn() {
                Ok(child) => return Ok(child),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(AudioError::Playback(e.to_string())),
            }
        }
        Err(AudioError::Unavailable("no audio player found on PATH".into()))
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError> {
        let mut child = self.spawn(sound, volume)?;
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    fn preview(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError> {
        self.stop_preview();
        self.preview = Some(self.spawn(sound, volume)?);
        Ok(())
    }

    fn stop_preview(&mut self) {
        if let Some(mut child) = self.preview.take() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "preview already finished");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.stop_preview();
    }
}

#[cfg(target_os = "macos")]
fn player_commands(path: &Path, volume: Volume) -> Vec<Command> {
    let mut afplay = Command::new("afplay");
    afplay.arg("-v").arg(format!("{:.2}", volume.as_f32())).arg(path);
    vec![afplay]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn player_commands(path: &Path, volume: Volume) -> Vec<Command> {
    // PulseAudio volume is linear with 65536 as 100%.
    let mut paplay = Command::new("paplay");
    paplay
        .arg(format!("--volume={}", u32::from(volume.percent()) * 65536 / 100))
        .arg(path);

    let mut ffplay = Command::new("ffplay");
    ffplay
        .args(["-nodisp", "-autoexit", "-loglevel", "quiet", "-volume"])
        .arg(volume.percent().to_string())
        .arg(path);

    vec![paplay, ffplay]
}

#[cfg(not(unix))]
fn player_commands(_path: &Path, _volume: Volume) -> Vec<Command> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_fails_without_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = CommandPlayer::new(dir.path());
        assert!(matches!(
            player.play(Sound::DigitalAlarm, Volume::FULL),
            Err(AudioError::MissingAsset(_))
        ));
        assert!(player.preview(Sound::EggTimer, Volume::PREVIEW).is_err());
        player.stop_preview();
    }
}
