//! Second-granular countdown.
//!
//! This is the bookkeeping half of the session clock: it owns the remaining
//! seconds and the running flag, and consumes one tick at a time. The other
//! half, [`Ticker`](super::Ticker), produces those ticks once per second.

/// Outcome of feeding one tick into a [`Countdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown was not running; nothing changed.
    Ignored,
    /// One second elapsed and time is left.
    Counting { remaining_secs: u32 },
    /// The countdown crossed zero and stopped itself.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u32,
    running: bool,
}

impl Countdown {
    pub fn new(remaining_secs: u32) -> Self {
        Self {
            remaining_secs,
            running: false,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin counting. Returns `false` (and does nothing) when already
    /// running or when no time is left.
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining_secs == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Halt counting. Returns whether the countdown was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// Load a new remaining time without touching the running flag.
    pub fn set(&mut self, remaining_secs: u32) {
        self.remaining_secs = remaining_secs;
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Ignored;
        }
        if self.remaining_secs <= 1 {
            self.remaining_secs = 0;
            self.running = false;
            return Tick::Expired;
        }
        self.remaining_secs -= 1;
        Tick::Counting {
            remaining_secs: self.remaining_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_refuses_when_empty() {
        let mut countdown = Countdown::new(0);
        assert!(!countdown.start());
        assert!(!countdown.is_running());
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut countdown = Countdown::new(10);
        assert!(countdown.start());
        assert!(!countdown.start());
        assert!(countdown.stop());
        assert!(!countdown.stop());
    }

    #[test]
    fn ticks_count_down_then_expire_once() {
        let mut countdown = Countdown::new(3);
        countdown.start();
        assert_eq!(countdown.tick(), Tick::Counting { remaining_secs: 2 });
        assert_eq!(countdown.tick(), Tick::Counting { remaining_secs: 1 });
        assert_eq!(countdown.tick(), Tick::Expired);
        assert_eq!(countdown.remaining_secs(), 0);
        assert!(!countdown.is_running());
        assert_eq!(countdown.tick(), Tick::Ignored);
    }

    #[test]
    fn paused_countdown_ignores_ticks() {
        let mut countdown = Countdown::new(5);
        assert_eq!(countdown.tick(), Tick::Ignored);
        assert_eq!(countdown.remaining_secs(), 5);
    }
}
