//! Recording timer.
//!
//! A `RecordingTicker` owns the spawned tick task. Dropping it aborts the
//! task, so the timer cannot outlive the Recording state that created it.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Scoped periodic task driving `Recording.elapsed`
#[derive(Debug)]
pub struct RecordingTicker {
    handle: JoinHandle<()>,
}

impl RecordingTicker {
    /// Spawn a ticker calling `on_tick` every `period`.
    ///
    /// The first call happens one full period after spawning. The task ends
    /// on its own once `on_tick` returns `false`.
    pub fn spawn<F>(runtime: &Handle, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = runtime.spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the timer; equivalent to dropping the guard
    pub fn stop(self) {}
}

impl Drop for RecordingTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
