use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use tracing::error;

/// Stall budget before the process is terminated.
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(8);

const MONITOR_INTERVAL: Duration = Duration::from_secs(1);

/// Exit code reported when the watchdog fires; the supervisor restarts the
/// process, mirroring a hardware reset.
const STARVED_EXIT_CODE: i32 = 86;

/// Host-side task watchdog. The worker loop feeds it once per tick; if feeds
/// stop for longer than [`WATCHDOG_TIMEOUT`] the monitor terminates the
/// process. This is the system's sole recovery path for a stalled loop.
#[derive(Clone)]
pub struct Watchdog {
    base: Instant,
    last_fed_ms: Arc<AtomicU64>,
}

impl Watchdog {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            last_fed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        self.base.elapsed().as_millis() as u64
    }

    pub fn feed(&self) {
        self.last_fed_ms.store(self.elapsed_ms(), Ordering::Relaxed);
    }

    fn starved(&self, timeout: Duration) -> bool {
        self.elapsed_ms()
            .saturating_sub(self.last_fed_ms.load(Ordering::Relaxed))
            > timeout.as_millis() as u64
    }

    pub fn spawn_monitor(&self) {
        let watchdog = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(MONITOR_INTERVAL);
            loop {
                ticker.tick().await;
                if watchdog.starved(WATCHDOG_TIMEOUT) {
                    error!(
                        "watchdog starved for over {}s, resetting",
                        WATCHDOG_TIMEOUT.as_secs()
                    );
                    std::process::exit(STARVED_EXIT_CODE);
                }
            }
        });
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_watchdog_is_not_starved() {
        let watchdog = Watchdog::new();
        assert!(!watchdog.starved(WATCHDOG_TIMEOUT));
    }

    #[test]
    fn feed_resets_the_stall_budget() {
        let watchdog = Watchdog::new();
        std::thread::sleep(Duration::from_millis(30));

        assert!(watchdog.starved(Duration::from_millis(10)));
        watchdog.feed();
        assert!(!watchdog.starved(Duration::from_millis(10)));
    }

    #[test]
    fn clones_share_the_feed_state() {
        let watchdog = Watchdog::new();
        let feeder = watchdog.clone();
        std::thread::sleep(Duration::from_millis(30));

        feeder.feed();
        assert!(!watchdog.starved(Duration::from_millis(10)));
    }
}
