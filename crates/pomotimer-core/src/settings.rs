//! Settings staging.
//!
//! While the settings dialog is open the user edits a draft copy of the
//! committed presets and sound. Nothing reaches the session machine until
//! [`SettingsStaging::save`]; [`SettingsStaging::cancel`] throws the draft
//! away.

use serde::Serialize;
use tracing::debug;

use crate::audio::{AudioPlayer, Sound, Volume};
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::notify::Notifier;
use crate::storage::PresetStore;
use crate::timer::{PresetConfig, SessionMachine, SessionType, MAX_PRESET_MINUTES, MIN_PRESET_MINUTES};

/// Draft values shown in the settings dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Draft {
    /// Durations in seconds. May hold zero while an input is empty.
    pub presets: PresetConfig,
    pub sound: Sound,
}

impl Draft {
    pub fn minutes(&self, session: SessionType) -> u32 {
        self.presets.minutes(session)
    }
}

pub struct SettingsStaging<A> {
    draft: Option<Draft>,
    audio: A,
    preview_volume: Volume,
}

impl<A: AudioPlayer> SettingsStaging<A> {
    pub fn new(audio: A, preview_volume: Volume) -> Self {
        Self {
            draft: None,
            audio,
            preview_volume,
        }
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Copy the committed values into a fresh draft. The copied sound is
    /// not previewed. Reopening discards any previous draft.
    pub fn open(&mut self, presets: PresetConfig, sound: Sound) -> &Draft {
        self.audio.stop_preview();
        self.draft.insert(Draft { presets, sound })
    }

    /// Edit a duration while the input has focus. The value is clamped to
    /// 0..=999 minutes; zero stands for an empty input. Returns the stored
    /// minutes.
    ///
    /// # Errors
    /// Returns [`ValidationError::StagingClosed`] if no draft is open.
    pub fn set_draft_duration(&mut self, session: SessionType, minutes: i64) -> Result<u32, CoreError> {
        let draft = self.draft.as_mut().ok_or(ValidationError::StagingClosed)?;
        let clamped = minutes.clamp(0, i64::from(MAX_PRESET_MINUTES)) as u32;
        draft.presets.set_duration(session, clamped * 60);
        Ok(clamped)
    }

    /// Edit a duration from raw text input. Anything that is not a number
    /// counts as an empty input.
    ///
    /// # Errors
    /// Returns [`ValidationError::StagingClosed`] if no draft is open.
    pub fn edit_draft_duration(&mut self, session: SessionType, input: &str) -> Result<u32, CoreError> {
        let minutes = input.trim().parse::<i64>().unwrap_or(0);
        self.set_draft_duration(session, minutes)
    }

    /// Finish editing a duration (the input lost focus). Values below one
    /// minute snap up to one minute. Returns the stored minutes.
    ///
    /// # Errors
    /// Returns [`ValidationError::StagingClosed`] if no draft is open.
    pub fn commit_draft_duration(&mut self, session: SessionType) -> Result<u32, CoreError> {
        let draft = self.draft.as_mut().ok_or(ValidationError::StagingClosed)?;
        let minutes = draft.presets.minutes(session).max(MIN_PRESET_MINUTES);
        draft.presets.set_duration(session, minutes * 60);
        Ok(minutes)
    }

    /// Select a draft sound. A change previews the new sound, replacing any
    /// preview still playing; selecting the current sound again does
    /// nothing.
    ///
    /// # Errors
    /// Returns [`ValidationError::StagingClosed`] if no draft is open.
    pub fn set_draft_sound(&mut self, sound: Sound) -> Result<(), CoreError> {
        let draft = self.draft.as_mut().ok_or(ValidationError::StagingClosed)?;
        if draft.sound == sound {
            return Ok(());
        }
        draft.sound = sound;

        self.audio.stop_preview();
        if let Err(e) = self.audio.preview(sound, self.preview_volume) {
            debug!(error = %e, %sound, "sound preview failed");
        }
        Ok(())
    }

    /// Snap every draft duration, hand the draft to the machine, and close.
    ///
    /// The draft is closed even when the machine reports a persistence
    /// error, because the machine has committed the values in memory by
    /// then.
    ///
    /// # Errors
    /// Returns [`ValidationError::StagingClosed`] if no draft is open, or
    /// whatever [`SessionMachine::apply_settings`] returns.
    pub fn save<N: Notifier, S: PresetStore>(
        &mut self,
        machine: &mut SessionMachine<N, S>,
    ) -> Result<Event, CoreError> {
        if !self.is_open() {
            return Err(ValidationError::StagingClosed.into());
        }
        for session in SessionType::ALL {
            self.commit_draft_duration(session)?;
        }
        let Some(draft) = self.draft.take() else {
            return Err(ValidationError::StagingClosed.into());
        };
        self.audio.stop_preview();
        machine.apply_settings(draft.presets, draft.sound)
    }

    /// Discard the draft. Committed settings are untouched.
    pub fn cancel(&mut self) {
        self.audio.stop_preview();
        self.draft = None;
    }
}
