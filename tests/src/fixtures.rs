//! Test fixtures and event generators.

use serde_json::{json, Value};

pub const CHROME_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
pub const EDGE_DESKTOP: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0";
pub const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Mobile/15E148 Safari/605.1.15";
pub const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 17_2 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15";

/// A page view submission.
pub fn page_view(visitor_id: Option<&str>) -> Value {
    let mut event = json!({
        "event": "page_view",
        "referrer": "https://github.com",
        "timeOnPage": 42
    });
    if let Some(id) = visitor_id {
        event["visitorId"] = json!(id);
    }
    event
}

/// A submission for any event type with an optional version.
pub fn event(name: &str, version: Option<&str>) -> Value {
    match version {
        Some(v) => json!({ "event": name, "version": v }),
        None => json!({ "event": name }),
    }
}

/// A record as it would sit in the store after ingest.
pub fn stored_event(name: &str, timestamp: &str, extra: Value) -> String {
    let mut record = json!({ "event": name, "timestamp": timestamp });
    if let (Some(record), Value::Object(extra)) = (record.as_object_mut(), extra) {
        record.extend(extra);
    }
    record.to_string()
}

/// A body larger than the 64KB `/track` limit.
pub fn oversized_body() -> String {
    json!({ "event": "page_view", "padding": "x".repeat(70_000) }).to_string()
}
