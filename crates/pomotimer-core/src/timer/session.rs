use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest duration a committed preset may have.
pub const MIN_PRESET_MINUTES: u32 = 1;
/// Longest duration a committed preset may have.
pub const MAX_PRESET_MINUTES: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub const ALL: [SessionType; 3] = [
        SessionType::Focus,
        SessionType::ShortBreak,
        SessionType::LongBreak,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::ShortBreak => "short_break",
            SessionType::LongBreak => "long_break",
        }
    }

    /// Tab title shown by the presentation layer.
    pub fn title(self) -> &'static str {
        match self {
            SessionType::Focus => "Pomodoro",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    /// Caption under the clock. Focus sessions are numbered from the
    /// completed cycle count.
    pub fn caption(self, cycle_count: u32) -> String {
        match self {
            SessionType::Focus => format!("Pomodoro #{}", cycle_count + 1),
            SessionType::ShortBreak => "Taking a break".to_string(),
            SessionType::LongBreak => "Taking a long break".to_string(),
        }
    }

    pub fn is_break(self) -> bool {
        !matches!(self, SessionType::Focus)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(&['-', ' '][..], "_");
        match normalized.as_str() {
            "focus" | "pomodoro" | "work" => Ok(SessionType::Focus),
            "short" | "short_break" | "shortbreak" => Ok(SessionType::ShortBreak),
            "long" | "long_break" | "longbreak" => Ok(SessionType::LongBreak),
            _ => Err(ValidationError::UnknownSessionType(s.to_string())),
        }
    }
}

/// Per-session durations, in seconds.
///
/// A committed config always holds whole minutes within
/// [`MIN_PRESET_MINUTES`]..=[`MAX_PRESET_MINUTES`]; a settings draft may
/// transiently hold zero while an input is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub focus: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            focus: 25 * 60,
            short_break: 5 * 60,
            long_break: 15 * 60,
        }
    }
}

impl PresetConfig {
    /// Build a config from minute values, rejecting anything out of range.
    ///
    /// # Errors
    /// Returns [`ValidationError::PresetOutOfRange`] for the first invalid value.
    pub fn from_minutes(focus: u32, short_break: u32, long_break: u32) -> Result<Self, ValidationError> {
        let config = Self {
            focus: focus.saturating_mul(60),
            short_break: short_break.saturating_mul(60),
            long_break: long_break.saturating_mul(60),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn duration(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Focus => self.focus,
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
        }
    }

    pub fn minutes(&self, session: SessionType) -> u32 {
        self.duration(session) / 60
    }

    pub fn set_duration(&mut self, session: SessionType, secs: u32) {
        match session {
            SessionType::Focus => self.focus = secs,
            SessionType::ShortBreak => self.short_break = secs,
            SessionType::LongBreak => self.long_break = secs,
        }
    }

    /// Check the committed-config invariant for every session type.
    ///
    /// # Errors
    /// Returns [`ValidationError::PresetOutOfRange`] for the first duration
    /// that is not a whole number of minutes within bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for session in SessionType::ALL {
            let secs = self.duration(session);
            let in_range = (MIN_PRESET_MINUTES * 60..=MAX_PRESET_MINUTES * 60).contains(&secs);
            if !in_range || secs % 60 != 0 {
                return Err(ValidationError::PresetOutOfRange {
                    session: session.to_string(),
                    secs,
                });
            }
        }
        Ok(())
    }
}
