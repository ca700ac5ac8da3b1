//! Read path: scan the store and fold everything into a snapshot.

use std::sync::Arc;

use engine_core::retention::KeyNamespace;
use engine_core::{Error, Result, StatsBuilder, StatsSnapshot};
use telemetry::metrics;
use tokio::task::JoinSet;
use tracing::debug;

use crate::KvStore;

/// Counts from one aggregation scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub counters: usize,
    pub events: usize,
    /// Records that were present but malformed
    pub skipped: usize,
    /// Records listed but gone (expired) by the time they were read
    pub vanished: usize,
    pub visitors: usize,
}

/// Build a fresh snapshot from every counter, event and visitor key.
///
/// Any store failure aborts the scan; a partial snapshot is never returned.
pub async fn collect_stats(
    store: Arc<dyn KvStore>,
    read_concurrency: usize,
) -> Result<(StatsSnapshot, ScanSummary)> {
    let counter_keys = store.list(KeyNamespace::Counter.prefix()).await?;
    let event_keys = store.list(KeyNamespace::Event.prefix()).await?;
    let visitor_keys = store.list(KeyNamespace::Visitor.prefix()).await?;

    let mut summary = ScanSummary {
        counters: counter_keys.len(),
        visitors: visitor_keys.len(),
        ..Default::default()
    };
    let mut builder = StatsBuilder::new();

    for (key, value) in fetch_values(&store, counter_keys, read_concurrency).await? {
        builder.fold_counter(&key, value.as_deref());
    }

    for (key, value) in fetch_values(&store, event_keys, read_concurrency).await? {
        let Some(raw) = value else {
            summary.vanished += 1;
            continue;
        };
        if let Err(e) = builder.fold_event(&raw) {
            summary.skipped += 1;
            debug!(key = %key, error = %e, "Skipping malformed event record");
        }
    }

    summary.events = builder.events_folded() as usize;
    metrics().stored_events_skipped.inc_by(summary.skipped as u64);
    metrics().last_scan_event_count.set(summary.events as u64);

    Ok((builder.finish(summary.visitors as u64), summary))
}

/// Point-read every key with at most `concurrency` reads in flight.
///
/// Output order is unspecified.
async fn fetch_values(
    store: &Arc<dyn KvStore>,
    keys: Vec<String>,
    concurrency: usize,
) -> Result<Vec<(String, Option<String>)>> {
    let concurrency = concurrency.max(1);
    let mut values = Vec::with_capacity(keys.len());
    let mut pending = keys.into_iter();
    let mut tasks = JoinSet::new();

    loop {
        while tasks.len() < concurrency {
            let Some(key) = pending.next() else { break };
            let store = Arc::clone(store);
            tasks.spawn(async move {
                let value = store.get(&key).await?;
                Ok::<_, Error>((key, value))
            });
        }

        match tasks.join_next().await {
            Some(joined) => {
                let pair = joined.map_err(|e| Error::internal(format!("read task failed: {e}")))??;
                values.push(pair);
            }
            None => break,
        }
    }

    Ok(values)
}
