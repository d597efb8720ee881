use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;
use vsn_core::{Error, Result};

use crate::manager::IngestManager;

/// Runs the ingestion job once at startup and then on a fixed period.
/// Each run is awaited before the next tick is taken.
pub struct Scheduler {
    manager: Arc<IngestManager>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(manager: Arc<IngestManager>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::Config("scrape interval must be greater than zero".to_string()));
        }
        Ok(Self { manager, interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(
            every = %format_duration(self.interval),
            "⏰ Scheduler started, first run now"
        );

        let mut ticker = time::interval(self.interval);
        // Late ticks shift the schedule rather than firing in a burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let outcome = self.manager.run_once().await;
            info!(
                new = outcome.new_articles(),
                "💤 Next run in {}",
                format_duration(self.interval)
            );
        }
    }
}

/// `6h`, `1h30m`, `45s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total == 0 {
        return format!("{}ms", duration.as_millis());
    }

    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    out
}
