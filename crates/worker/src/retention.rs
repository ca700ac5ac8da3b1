//! Sweep worker for expired entries.
//!
//! Event records and visitor markers carry an expiry. Remote backends drop
//! them on their own; the in-memory backend only hides them until a sweep
//! removes them.

use std::sync::Arc;
use std::time::Instant;

use engine_core::Result;
use kv_store::KvStore;
use telemetry::metrics;
use tracing::{debug, info};

/// Worker that reclaims expired entries from the store.
pub struct SweepWorker {
    store: Arc<dyn KvStore>,
}

impl SweepWorker {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Run one sweep. Returns the number of entries removed.
    pub async fn run(&self) -> Result<usize> {
        let started = Instant::now();
        let removed = self.store.purge_expired().await?;
        metrics().entries_swept.inc_by(removed as u64);

        if removed > 0 {
            info!(
                backend = self.store.backend_name(),
                removed,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Expired entries swept"
            );
        } else {
            debug!(backend = self.store.backend_name(), "Nothing to sweep");
        }

        Ok(removed)
    }
}
