//! Post-write cache corrections
//!
//! After the source of truth accepts a write, the matching feed cache
//! mutation runs as its own task. The write never waits on it and never fails
//! because of it; the outcome is logged and handed back through the receipt's
//! join handle for callers that want it.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::feed::CacheOutcome;

/// Result of a write plus the handle of its cache correction task.
#[derive(Debug)]
pub struct WriteReceipt<T> {
    pub value: T,
    pub cache_update: JoinHandle<CacheOutcome>,
}

impl<T> WriteReceipt<T> {
    /// Drops the cache task handle; the task keeps running.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Waits for the cache correction and returns both parts.
    pub async fn settle(self) -> (T, CacheOutcome) {
        let outcome = match self.cache_update.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "feed cache update task did not complete");
                CacheOutcome::Unavailable(CacheError::Store(err.to_string()))
            }
        };
        (self.value, outcome)
    }
}

/// Spawns `update` and logs how it went.
pub fn spawn_cache_update<F>(
    op: &'static str,
    post_id: String,
    update: F,
) -> JoinHandle<CacheOutcome>
where
    F: Future<Output = CacheOutcome> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = update.await;
        match &outcome {
            CacheOutcome::Applied => debug!(op, %post_id, "feed cache updated"),
            CacheOutcome::Skipped(reason) => {
                debug!(op, %post_id, ?reason, "feed cache update skipped")
            }
            CacheOutcome::Unavailable(err) => warn!(
                op,
                %post_id,
                error = %err,
                "feed cache update failed; entry heals on next warm-up or expiry"
            ),
        }
        outcome
    })
}
