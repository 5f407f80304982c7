//! Countdown ticker and clock helpers.
//!
//! A [`Ticker`] is a background tokio task that emits one tick per period
//! over a bounded channel. Cancelling or dropping the ticker aborts the task,
//! so no tick can be observed after the owner stops listening.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default countdown resolution.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a running countdown task.
pub struct Ticker {
    rx: mpsc::Receiver<()>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn a ticker whose first tick arrives one `period` from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    /// Wait for the next tick. Returns `false` once the ticker is cancelled.
    ///
    /// Cancel-safe: may be used as a `tokio::select!` branch.
    pub async fn tick(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }

    /// Stop the countdown task and discard any buffered tick.
    pub fn cancel(&mut self) {
        self.handle.abort();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    #[cfg(test)]
    pub(crate) fn task(&self) -> tokio::task::AbortHandle {
        self.handle.abort_handle()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Urgency of the remaining time, relative to the full duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBand {
    Normal,
    /// 25% or less of the time remains.
    Warning,
    /// 10% or less of the time remains.
    Critical,
}

impl TimeBand {
    pub fn classify(remaining_secs: u64, duration_secs: u64) -> Self {
        if duration_secs == 0 {
            return TimeBand::Critical;
        }
        let percentage = remaining_secs as f64 / duration_secs as f64 * 100.0;
        if percentage <= 10.0 {
            TimeBand::Critical
        } else if percentage <= 25.0 {
            TimeBand::Warning
        } else {
            TimeBand::Normal
        }
    }
}

/// Format seconds as `HH:MM:SS`.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(59), "00:00:59");
        assert_eq!(format_clock(3 * 3600 + 5 * 60 + 7), "03:05:07");
        assert_eq!(format_clock(200 * 60), "03:20:00");
    }

    #[test]
    fn time_bands() {
        assert_eq!(TimeBand::classify(1800, 1800), TimeBand::Normal);
        assert_eq!(TimeBand::classify(450, 1800), TimeBand::Warning);
        assert_eq!(TimeBand::classify(180, 1800), TimeBand::Critical);
        assert_eq!(TimeBand::classify(0, 0), TimeBand::Critical);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let start = Instant::now();
        let mut ticker = Ticker::start(Duration::from_secs(1));

        assert!(ticker.tick().await);
        assert!(ticker.tick().await);
        assert!(ticker.tick().await);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let mut ticker = Ticker::start(Duration::from_secs(1));
        assert!(ticker.tick().await);

        ticker.cancel();
        assert!(!ticker.tick().await);
        assert!(!ticker.tick().await);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_task() {
        let mut ticker = Ticker::start(Duration::from_secs(1));
        assert!(ticker.tick().await);
        let task = ticker.task();
        assert!(!task.is_finished());

        drop(ticker);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(task.is_finished());
    }
}
