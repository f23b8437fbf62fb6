//! Desktop notifications through the platform notification service.

use notify_rust::Notification;
use tracing::{debug, info};

use super::{Alert, Notifier, Permission};
use crate::audio::{AudioPlayer, Volume};

/// Gateway to the desktop notification service.
///
/// Desktop hosts have no interactive permission prompt, so a pending
/// request is granted unless notifications were turned off in the config,
/// in which case the gateway starts out denied and never asks again.
pub struct DesktopNotifier<A> {
    app_name: String,
    permission: Permission,
    audio: A,
    volume: Volume,
}

impl<A: AudioPlayer> DesktopNotifier<A> {
    pub fn new(app_name: impl Into<String>, enabled: bool, audio: A, volume: Volume) -> Self {
        Self {
            app_name: app_name.into(),
            permission: if enabled {
                Permission::Default
            } else {
                Permission::Denied
            },
            audio,
            volume,
        }
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    fn show(&self, alert: &Alert) -> Result<(), notify_rust::error::Error> {
        let mut notification = Notification::new();
        notification
            .summary(&alert.title)
            .body(&alert.body)
            .appname(&self.app_name)
            .icon("alarm-clock");

        // Tag travels as a hint so it can be matched in notification logs.
        #[cfg(all(unix, not(target_os = "macos")))]
        notification.hint(notify_rust::Hint::Custom(
            "x-pomotimer-tag".to_string(),
            alert.tag.clone(),
        ));

        notification.show().map(|_| ())
    }
}

impl<A: AudioPlayer> Notifier for DesktopNotifier<A> {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        if self.permission == Permission::Default {
            self.permission = Permission::Granted;
            info!("notification permission granted");
        }
        self.permission
    }

    fn notify(&mut self, alert: &Alert) {
        if self.permission != Permission::Granted {
            debug!(title = %alert.title, permission = ?self.permission, "alert suppressed");
            return;
        }

        if let Some(sound) = alert.sound {
            if let Err(e) = self.audio.play(sound, self.volume) {
                debug!(error = %e, sound = %sound, "alert sound failed");
            }
        }

        if let Err(e) = self.show(alert) {
            debug!(error = %e, title = %alert.title, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;

    #[test]
    fn disabled_gateway_never_grants() {
        let mut notifier = DesktopNotifier::new("pomotimer", false, SilentPlayer, Volume::FULL);
        assert_eq!(notifier.permission(), Permission::Denied);
        assert_eq!(notifier.request_permission(), Permission::Denied);
    }

    #[test]
    fn request_grants_once() {
        let mut notifier = DesktopNotifier::new("pomotimer", true, SilentPlayer, Volume::FULL);
        assert_eq!(notifier.permission(), Permission::Default);
        assert_eq!(notifier.request_permission(), Permission::Granted);
        assert_eq!(notifier.request_permission(), Permission::Granted);
    }
}
