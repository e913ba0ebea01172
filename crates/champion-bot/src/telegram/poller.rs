//! Long-polling loop
//!
//! Drains `getUpdates` one batch at a time and hands each update to the
//! dispatcher, finishing it before the next. Transport failures back off
//! exponentially; shutdown is observed between updates.

use async_trait::async_trait;
use bot_core::{Result, Update};
use bot_handlers::{DispatchOutcome, Dispatcher};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Source of inbound updates
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with id at least `offset`, waiting up to `timeout` for new ones
    async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>>;
}

/// Poll loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl PollerConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }
}

/// Double the delay, capped at `max`
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Run until `shutdown` turns true, returning the number of updates dispatched
pub async fn poll_loop<S>(
    source: &S,
    dispatcher: &Dispatcher,
    config: PollerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> u64
where
    S: UpdateSource + ?Sized,
{
    let mut offset: Option<i64> = None;
    let mut backoff = config.initial_backoff;
    let mut processed = 0u64;

    info!(timeout_secs = config.timeout.as_secs(), "Poller started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let batch = tokio::select! {
            result = source.get_updates(offset, config.timeout) => result,
            _ = shutdown.changed() => break,
        };

        let updates = match batch {
            Ok(updates) => {
                backoff = config.initial_backoff;
                updates
            }
            Err(e) => {
                warn!(error = %e, backoff_ms = backoff.as_millis(), "Failed to fetch updates");
                tokio::select! {
                    () = tokio::time::sleep(backoff) => {}
                    _ = shutdown.changed() => break,
                }
                backoff = next_backoff(backoff, config.max_backoff);
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let outcome = dispatcher.dispatch(&update).await;
            processed += 1;
            if outcome != DispatchOutcome::Handled {
                debug!(update_id = update.update_id, outcome = ?outcome, "Update dispatched");
            }
            if *shutdown.borrow() {
                break;
            }
        }
    }

    info!(processed, "Poller stopped");
    processed
}
