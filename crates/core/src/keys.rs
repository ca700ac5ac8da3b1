//! Key namespaces used in the key-value store.
//!
//! - `event:<writeTimeMillis>:<suffix>` raw event records
//! - `counter:<eventType>:<version>` running counters
//! - `visitor:<visitorId>` first-seen markers

use uuid::Uuid;

pub const EVENT_PREFIX: &str = "event:";
pub const COUNTER_PREFIX: &str = "counter:";
pub const VISITOR_PREFIX: &str = "visitor:";

/// Version label used in counter keys when the event carries none.
pub const ALL_VERSIONS: &str = "all";

/// Length of the random suffix appended to event keys.
pub const SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Key for a raw event written at `millis`.
pub fn event_key(millis: i64, suffix: &str) -> String {
    format!("{EVENT_PREFIX}{millis}:{suffix}")
}

/// Nine lowercase alphanumerics drawn from a v4 UUID.
pub fn random_suffix() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        out.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

/// Counter key for an event type and optional version.
pub fn counter_key(event: &str, version: Option<&str>) -> String {
    format!(
        "{COUNTER_PREFIX}{event}:{}",
        version.unwrap_or(ALL_VERSIONS)
    )
}

/// Split a counter key into `(eventType, version)`.
///
/// The version keeps any further `:` separators.
pub fn parse_counter_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(COUNTER_PREFIX)?;
    let (event, version) = rest.split_once(':')?;
    if event.is_empty() {
        return None;
    }
    Some((event, version))
}

/// Marker key for a visitor.
pub fn visitor_key(visitor_id: &str) -> String {
    format!("{VISITOR_PREFIX}{visitor_id}")
}
