//! Once-per-second tick source.
//!
//! A [`Ticker`] owns at most one spawned interval task. Each start bumps a
//! generation counter that is stamped on every [`TickSignal`], so a tick that
//! was already queued when the ticker stopped can be recognised and dropped
//! by the consumer instead of counting against the next run.
//!
//! Must be used from within a tokio runtime.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    pub generation: u64,
}

struct ActiveTicker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Ticker {
    period: Duration,
    tx: mpsc::Sender<TickSignal>,
    generation: u64,
    active: Option<ActiveTicker>,
}

impl Ticker {
    pub fn new(period: Duration, tx: mpsc::Sender<TickSignal>) -> Self {
        Self {
            period,
            tx,
            generation: 0,
            active: None,
        }
    }

    pub fn every_second(tx: mpsc::Sender<TickSignal>) -> Self {
        Self::new(TICK_PERIOD, tx)
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `signal` belongs to the current run.
    pub fn accepts(&self, signal: &TickSignal) -> bool {
        self.is_running() && signal.generation == self.generation
    }

    /// Spawn the interval task. The first tick arrives one full period after
    /// this call. No-op while already running.
    pub fn start(&mut self) {
        if self.active.is_some() {
            return;
        }
        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let tx = self.tx.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(TickSignal { generation }).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        trace!(generation, "ticker started");
        self.active = Some(ActiveTicker { cancel, handle });
    }

    /// Cancel the interval task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.handle.abort();
            trace!(generation = self.generation, "ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn emits_one_tick_per_period() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = Ticker::every_second(tx);
        ticker.start();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let mut received = 0;
        while let Ok(signal) = rx.try_recv() {
            assert!(ticker.accepts(&signal));
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_releases_the_task() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = Ticker::every_second(tx);
        ticker.start();
        ticker.stop();
        assert!(!ticker.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_invalidates_queued_ticks() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = Ticker::every_second(tx);
        ticker.start();
        tokio::time::sleep(Duration::from_millis(1100)).await;

        ticker.stop();
        ticker.start();
        let stale = rx.recv().await.unwrap();
        assert!(!ticker.accepts(&stale));

        let fresh = rx.recv().await.unwrap();
        assert!(ticker.accepts(&fresh));
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_keeps_generation() {
        let (tx, _rx) = mpsc::channel(8);
        let mut ticker = Ticker::every_second(tx);
        ticker.start();
        let generation = ticker.generation();
        ticker.start();
        assert_eq!(ticker.generation(), generation);
    }
}
