//! Write path: persist one event, bump its counter, mark first-seen visitors.

use chrono::{DateTime, SecondsFormat, Utc};
use engine_core::keys::{counter_key, event_key, random_suffix, visitor_key};
use engine_core::retention::KeyNamespace;
use engine_core::stats::parse_counter_value;
use engine_core::{EventFields, EventRecord, RequestContext, Result, TrackRequest};
use telemetry::metrics;
use tracing::debug;

use crate::KvStore;

/// What a successful ingest wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
    /// Key of the stored event record
    pub key: String,
    /// Counter value after this ingest
    pub counter: u64,
    /// Whether a new visitor marker was written
    pub visitor_marked: bool,
}

/// Record one validated event.
///
/// Steps run in order and stop at the first failure; earlier writes are kept.
pub async fn track_event(
    store: &dyn KvStore,
    fields: EventFields,
    request: &TrackRequest,
    ctx: &RequestContext,
    now: DateTime<Utc>,
) -> Result<TrackOutcome> {
    let record = EventRecord::build(fields, ctx, now);
    let key = event_key(now.timestamp_millis(), &random_suffix());
    store
        .put(&key, &record.to_json()?, KeyNamespace::Event.ttl())
        .await?;

    let counter = increment_counter(store, &request.event, request.version.as_deref()).await?;

    let visitor_marked = match request.visitor_id.as_deref() {
        Some(visitor_id) if request.is_page_view() => {
            let first_seen = now.to_rfc3339_opts(SecondsFormat::Millis, true);
            mark_visitor(store, visitor_id, &first_seen).await?
        }
        _ => false,
    };

    if visitor_marked {
        metrics().visitor_markers_written.inc();
    }

    debug!(
        key = %key,
        event = %request.event,
        counter,
        visitor_marked,
        "Event tracked"
    );

    Ok(TrackOutcome {
        key,
        counter,
        visitor_marked,
    })
}

/// Read-then-write increment. Concurrent increments of one key can lose updates.
pub async fn increment_counter(
    store: &dyn KvStore,
    event: &str,
    version: Option<&str>,
) -> Result<u64> {
    let key = counter_key(event, version);
    let current = parse_counter_value(store.get(&key).await?.as_deref());
    let next = current.saturating_add(1);
    store
        .put(&key, &next.to_string(), KeyNamespace::Counter.ttl())
        .await?;
    Ok(next)
}

/// Write a visitor marker only if none exists. Returns whether it was written.
pub async fn mark_visitor(store: &dyn KvStore, visitor_id: &str, first_seen: &str) -> Result<bool> {
    let key = visitor_key(visitor_id);
    if store.get(&key).await?.is_some() {
        return Ok(false);
    }
    store
        .put(&key, first_seen, KeyNamespace::Visitor.ttl())
        .await?;
    Ok(true)
}
