//! # pomotimer Core Library
//!
//! Core logic for the pomotimer Pomodoro timer: focus sessions alternating
//! with short and long breaks, desktop alerts with an alarm sound, and
//! persisted presets. The CLI is a thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Session Machine**: single-owner state machine. The caller feeds it
//!   one `tick()` per second and forwards user intents
//! - **Ticker**: tokio interval task that produces those ticks and can be
//!   stopped at any moment
//! - **Settings Staging**: draft copy of presets and sound edited before
//!   being committed to the machine
//! - **Notification Gateway**: [`Notifier`] trait with a desktop
//!   implementation; [`AudioPlayer`] for alarm sounds
//! - **Storage**: SQLite key-value records for presets and sound, a session
//!   log, and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: core timer state machine
//! - [`SettingsStaging`]: draft settings with sound preview
//! - [`DatabasePresetStore`]: persisted presets
//! - [`Config`]: application configuration management

pub mod audio;
pub mod error;
pub mod events;
pub mod format;
pub mod notify;
pub mod settings;
pub mod storage;
pub mod timer;

pub use audio::{AudioPlayer, CommandPlayer, SilentPlayer, Sound, Volume};
pub use error::{AudioError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, TimerSnapshot};
pub use format::format_clock;
pub use notify::{Alert, DesktopNotifier, Notifier, Permission, SilentNotifier};
pub use settings::{Draft, SettingsStaging};
pub use storage::{
    Config, Database, DatabasePresetStore, MemoryPresetStore, PresetStore, Preferences, Stats,
};
pub use timer::{
    CompletionGuard, Countdown, PresetConfig, SessionMachine, SessionType, TickSignal, Ticker,
};
