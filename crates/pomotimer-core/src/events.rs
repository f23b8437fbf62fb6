use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::Sound;
use crate::format::format_clock;
use crate::timer::{PresetConfig, SessionType};

/// Every state change in the session machine produces an Event.
/// Front ends render from them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        finished: SessionType,
        next: SessionType,
        /// Cycle count after this completion.
        cycle_count: u32,
        /// Seconds spent in the finished session.
        duration_secs: u32,
        /// Finished by the user before the countdown reached zero.
        skipped: bool,
        at: DateTime<Utc>,
    },
    SessionSwitched {
        session: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    SessionReset {
        session: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    CyclesCleared {
        at: DateTime<Utc>,
    },
    SettingsApplied {
        presets: PresetConfig,
        sound: Sound,
        /// Whether the running countdown was stopped and reloaded.
        countdown_reset: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot(TimerSnapshot),
}

/// Read-only view of the machine for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub session: SessionType,
    pub remaining_secs: u32,
    pub running: bool,
    pub cycle_count: u32,
    /// `remaining_secs` as `mm:ss`.
    pub clock: String,
    pub caption: String,
    pub at: DateTime<Utc>,
}

impl TimerSnapshot {
    pub fn new(session: SessionType, remaining_secs: u32, running: bool, cycle_count: u32) -> Self {
        Self {
            session,
            remaining_secs,
            running,
            cycle_count,
            clock: format_clock(remaining_secs),
            caption: session.caption(cycle_count),
            at: Utc::now(),
        }
    }
}
