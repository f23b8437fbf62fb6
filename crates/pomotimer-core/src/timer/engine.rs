//! Session state machine.
//!
//! The machine does not own a thread or a timer. The caller feeds it one
//! `tick()` per second while it reports `is_running()`, typically from a
//! [`Ticker`](super::Ticker), and forwards user intents as method calls.
//!
//! ## State Transitions
//!
//! ```text
//! Idle-X --start--> Running-X --pause--> Idle-X
//! Running-X --tick at 0--> Idle-next(X)
//! any --switch_to(Y)--> Idle-Y
//! ```
//!
//! where `next(Focus)` is a long break on every fourth completed focus
//! session and a short break otherwise, and `next(break)` is focus.
//!
//! ## Usage
//!
//! ```ignore
//! let mut machine = SessionMachine::new(notifier, store);
//! machine.start();
//! // Once per second while running:
//! if let Some(event) = machine.tick() { /* session completed */ }
//! ```

use chrono::Utc;
use tracing::{debug, info};

use super::countdown::{Countdown, Tick};
use super::guard::CompletionGuard;
use super::session::{PresetConfig, SessionType};
use crate::audio::Sound;
use crate::error::CoreError;
use crate::events::{Event, TimerSnapshot};
use crate::notify::{Alert, Notifier};
use crate::storage::{PresetStore, Preferences};

/// Every n-th completed focus session is followed by a long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

pub struct SessionMachine<N, S> {
    notifier: N,
    store: S,
    presets: PresetConfig,
    sound: Sound,
    session: SessionType,
    countdown: Countdown,
    cycle_count: u32,
    guard: CompletionGuard,
}

impl<N: Notifier, S: PresetStore> SessionMachine<N, S> {
    /// Create a machine from the stored preferences.
    ///
    /// Starts in Idle-Focus with the focus preset loaded.
    pub fn new(notifier: N, store: S) -> Self {
        let Preferences { presets, sound } = store.load();
        Self {
            notifier,
            store,
            presets,
            sound,
            session: SessionType::Focus,
            countdown: Countdown::new(presets.duration(SessionType::Focus)),
            cycle_count: 0,
            guard: CompletionGuard::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session_type(&self) -> SessionType {
        self.session
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn presets(&self) -> PresetConfig {
        self.presets
    }

    pub fn sound(&self) -> Sound {
        self.sound
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(
            self.session,
            self.remaining_secs(),
            self.is_running(),
            self.cycle_count,
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle-X → Running-X. Asks for notification permission on the way;
    /// the answer never blocks the transition.
    pub fn start(&mut self) -> Option<Event> {
        if !self.countdown.start() {
            return None;
        }
        let permission = self.notifier.request_permission();
        debug!(?permission, "notification permission on start");
        self.guard.release();

        info!(session = %self.session, remaining_secs = self.remaining_secs(), "session started");
        Some(Event::SessionStarted {
            session: self.session,
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Running-X → Idle-X. Idempotent.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.countdown.stop() {
            return None;
        }
        debug!(session = %self.session, remaining_secs = self.remaining_secs(), "session paused");
        Some(Event::SessionPaused {
            session: self.session,
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Advance one second. Returns `Some(Event::SessionCompleted)` when this
    /// tick crosses zero.
    pub fn tick(&mut self) -> Option<Event> {
        match self.countdown.tick() {
            Tick::Ignored | Tick::Counting { .. } => None,
            Tick::Expired => self.complete_session(),
        }
    }

    /// Finish the current session: count it, alert, and load the next one
    /// in Idle. Dropped if a completion already happened since the
    /// countdown was last armed.
    pub fn complete_session(&mut self) -> Option<Event> {
        if !self.guard.try_acquire() {
            debug!(session = %self.session, "duplicate completion dropped");
            return None;
        }
        self.countdown.stop();

        let finished = self.session;
        let remaining = self.countdown.remaining_secs();
        let duration_secs = self.presets.duration(finished).saturating_sub(remaining);
        let next = match finished {
            SessionType::Focus => {
                self.cycle_count += 1;
                if self.cycle_count % LONG_BREAK_INTERVAL == 0 {
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Focus,
        };

        let at = Utc::now();
        let alert = Alert::session_finished(finished, next, self.cycle_count, self.sound, at);
        self.notifier.notify(&alert);

        self.session = next;
        self.countdown.set(self.presets.duration(next));

        info!(%finished, %next, cycle_count = self.cycle_count, "session completed");
        Some(Event::SessionCompleted {
            finished,
            next,
            cycle_count: self.cycle_count,
            duration_secs,
            skipped: remaining > 0,
            at,
        })
    }

    /// Finish the current session early at the user's request. Always
    /// completes, even right after another completion.
    pub fn skip_current(&mut self) -> Option<Event> {
        self.guard.release();
        self.complete_session()
    }

    /// Explicit tab selection. Stops the clock and loads the preset for
    /// `session`; the cycle count is untouched.
    pub fn switch_to(&mut self, session: SessionType) -> Event {
        self.countdown.stop();
        self.session = session;
        self.countdown.set(self.presets.duration(session));
        self.guard.release();

        Event::SessionSwitched {
            session,
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        }
    }

    /// Reload the preset for the current session type.
    pub fn reset_current(&mut self) -> Event {
        self.countdown.stop();
        self.countdown.set(self.presets.duration(self.session));
        self.guard.release();

        Event::SessionReset {
            session: self.session,
            remaining_secs: self.remaining_secs(),
            at: Utc::now(),
        }
    }

    /// Zero the cycle count and return to a fresh focus session.
    pub fn clear_cycles(&mut self) -> Event {
        self.countdown.stop();
        self.cycle_count = 0;
        self.switch_to(SessionType::Focus);
        Event::CyclesCleared { at: Utc::now() }
    }

    /// Commit new presets and sound.
    ///
    /// If any duration differs from the committed presets the clock stops
    /// and reloads the new duration for the current session; a sound-only
    /// change leaves the countdown alone. Both values are committed in
    /// memory before they are persisted, so a failed write still leaves the
    /// machine on the new settings.
    ///
    /// # Errors
    /// Returns a validation error, without changing anything, if `presets`
    /// breaks the committed-config invariant, or the store's error if the
    /// write fails.
    pub fn apply_settings(&mut self, presets: PresetConfig, sound: Sound) -> Result<Event, CoreError> {
        presets.validate()?;

        let countdown_reset = presets != self.presets;
        if countdown_reset {
            self.countdown.stop();
            self.countdown.set(presets.duration(self.session));
            self.guard.release();
        }
        self.presets = presets;
        self.sound = sound;
        info!(?presets, %sound, countdown_reset, "settings applied");

        self.store.save(&Preferences { presets, sound })?;
        Ok(Event::SettingsApplied {
            presets,
            sound,
            countdown_reset,
            at: Utc::now(),
        })
    }
}
