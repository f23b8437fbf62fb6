//! In-process playback through rodio.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::{existing_asset, AudioPlayer, Sound, Volume};
use crate::error::AudioError;

/// Audio player backed by the default output device.
///
/// The output stream is opened lazily on first use and kept for the life of
/// the player. `OutputStream` is not `Send`, so neither is this type.
pub struct RodioPlayer {
    sounds_dir: PathBuf,
    output: Option<(OutputStream, OutputStreamHandle)>,
    preview: Option<Sink>,
}

impl RodioPlayer {
    pub fn new(sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            sounds_dir: sounds_dir.into(),
            output: None,
            preview: None,
        }
    }

    fn sink(&mut self, sound: Sound, volume: Volume) -> Result<Sink, AudioError> {
        let path = existing_asset(sound, &self.sounds_dir)?;
        if self.output.is_none() {
            let stream = OutputStream::try_default()
                .map_err(|e| AudioError::Unavailable(e.to_string()))?;
            self.output = Some(stream);
        }
        let Some((_, handle)) = self.output.as_ref() else {
            return Err(AudioError::Unavailable("output stream closed".into()));
        };

        let file = File::open(&path).map_err(|e| AudioError::Playback(e.to_string()))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Playback(e.to_string()))?;
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Playback(e.to_string()))?;
        sink.set_volume(volume.as_f32());
        sink.append(source);
        Ok(sink)
    }
}

impl AudioPlayer for RodioPlayer {
    fn play(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError> {
        self.sink(sound, volume)?.detach();
        Ok(())
    }

    fn preview(&mut self, sound: Sound, volume: Volume) -> Result<(), AudioError> {
        self.stop_preview();
        self.preview = Some(self.sink(sound, volume)?);
        Ok(())
    }

    fn stop_preview(&mut self) {
        if let Some(sink) = self.preview.take() {
            sink.stop();
        }
    }
}
