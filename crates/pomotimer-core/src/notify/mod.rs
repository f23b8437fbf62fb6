//! Notification gateway.
//!
//! The session machine talks to the desktop only through [`Notifier`], so
//! tests and headless front ends can swap in their own implementation.

mod desktop;

pub use desktop::DesktopNotifier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::Sound;
use crate::timer::SessionType;

/// Host permission to show alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet.
    #[default]
    Default,
    Granted,
    Denied,
}

/// A user-visible alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
    /// Unique per alert so repeated alerts of the same kind are not merged.
    pub tag: String,
    /// Ask the host to alert again even if a similar alert is showing.
    pub renotify: bool,
    pub sound: Option<Sound>,
}

impl Alert {
    /// Alert for the transition out of `finished` into `next`.
    pub fn session_finished(
        finished: SessionType,
        next: SessionType,
        cycle_count: u32,
        sound: Sound,
        at: DateTime<Utc>,
    ) -> Self {
        let (title, body) = match (finished, next) {
            (SessionType::Focus, SessionType::LongBreak) => (
                "Time for a Long Break!".to_string(),
                format!("{cycle_count} pomodoros done. Step away for a while."),
            ),
            (SessionType::Focus, _) => (
                "Pomodoro Complete".to_string(),
                "Nice work. Take a short break.".to_string(),
            ),
            _ => (
                "Break is over!".to_string(),
                "Time to get back to focus.".to_string(),
            ),
        };
        Self {
            title,
            body,
            tag: format!("pomotimer-{}", at.timestamp_millis()),
            renotify: true,
            sound: Some(sound),
        }
    }
}

pub trait Notifier {
    fn permission(&self) -> Permission;

    /// Ask the host for permission. Only asks while the status is
    /// [`Permission::Default`]; returns the resulting status.
    fn request_permission(&mut self) -> Permission;

    /// Show `alert` if permission is granted, otherwise drop it silently.
    fn notify(&mut self, alert: &Alert);
}

/// Notifier that never shows anything and never plays sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Denied
    }

    fn notify(&mut self, _alert: &Alert) {}
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn permission(&self) -> Permission {
        (**self).permission()
    }

    fn request_permission(&mut self) -> Permission {
        (**self).request_permission()
    }

    fn notify(&mut self, alert: &Alert) {
        (**self).notify(alert)
    }
}
