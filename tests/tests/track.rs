//! End-to-end tests for `POST /track`.

use integration_tests::{fixtures, setup::TestContext};
use kv_store::KvStore;
use serde_json::{json, Value};

async fn stored_records(ctx: &TestContext) -> Vec<Value> {
    let mut records = Vec::new();
    for key in ctx.store.list("event:").await.unwrap() {
        let raw = ctx.store.get(&key).await.unwrap().unwrap();
        records.push(serde_json::from_str(&raw).unwrap());
    }
    records
}

#[tokio::test]
async fn test_track_returns_success() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/track")
        .json(&fixtures::event("install_click", Some("v1.2")))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_track_writes_event_and_counter() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/track")
        .add_header("User-Agent", fixtures::CHROME_DESKTOP)
        .add_header("CF-IPCountry", "DE")
        .add_header("CF-Connecting-IP", "198.51.100.4")
        .json(&fixtures::event("version_selected", Some("fw-2.0")))
        .await
        .assert_status_ok();

    let keys = ctx.store.list("event:").await.unwrap();
    assert_eq!(keys.len(), 1);
    let parts: Vec<&str> = keys[0].split(':').collect();
    assert_eq!(parts.len(), 3);
    assert!(parts[1].parse::<i64>().is_ok());
    assert_eq!(parts[2].len(), 9);
    assert!(parts[2]
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));

    let record = &stored_records(&ctx).await[0];
    assert_eq!(record["event"], "version_selected");
    assert_eq!(record["version"], "fw-2.0");
    assert_eq!(record["browser"], "Chrome");
    assert_eq!(record["device"], "Desktop");
    assert_eq!(record["country"], "DE");
    assert_eq!(record["ip"], "198.51.100.4");
    assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(record["hour"].as_u64().unwrap() < 24);
    assert!(record["dayOfWeek"].as_u64().unwrap() < 7);
    assert_eq!(record["month"].as_str().unwrap().len(), 7);

    assert_eq!(
        ctx.store.get("counter:version_selected:fw-2.0").await.unwrap().as_deref(),
        Some("1")
    );
}

#[tokio::test]
async fn test_counter_equals_number_of_ingests() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for _ in 0..12 {
        server
            .post("/track")
            .json(&fixtures::event("page_view", None))
            .await
            .assert_status_ok();
    }

    assert_eq!(
        ctx.store.get("counter:page_view:all").await.unwrap().as_deref(),
        Some("12")
    );
    assert_eq!(ctx.store.put_count("counter:page_view:all"), 12);
    assert_eq!(ctx.store.puts_with_prefix("event:"), 12);
}

#[tokio::test]
async fn test_repeat_visitor_writes_one_marker() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for _ in 0..2 {
        server
            .post("/track")
            .json(&fixtures::page_view(Some("visitor-123")))
            .await
            .assert_status_ok();
    }

    assert_eq!(ctx.store.put_count("visitor:visitor-123"), 1);
    assert_eq!(ctx.store.puts_with_prefix("visitor:"), 1);
}

#[tokio::test]
async fn test_visitor_marker_only_for_page_views() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/track")
        .json(&json!({ "event": "install_success", "visitorId": "visitor-9" }))
        .await
        .assert_status_ok();

    assert_eq!(ctx.store.puts_with_prefix("visitor:"), 0);
}

#[tokio::test]
async fn test_server_fields_override_client_fields() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/track")
        .add_header("User-Agent", fixtures::SAFARI_IPAD)
        .json(&json!({
            "event": "page_view",
            "timestamp": "1999-01-01T00:00:00.000Z",
            "browser": "Netscape",
            "hour": 99,
            "custom": { "nested": [1, 2] }
        }))
        .await
        .assert_status_ok();

    let record = &stored_records(&ctx).await[0];
    assert_ne!(record["timestamp"], "1999-01-01T00:00:00.000Z");
    assert_eq!(record["browser"], "Safari");
    assert_eq!(record["device"], "Tablet");
    assert!(record["hour"].as_u64().unwrap() < 24);
    assert_eq!(record["country"], "Unknown");
    assert_eq!(record["custom"], r#"{"nested":[1,2]}"#);
}

#[tokio::test]
async fn test_client_user_agent_used_without_header() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/track")
        .json(&json!({ "event": "page_view", "userAgent": fixtures::SAFARI_IPHONE }))
        .await
        .assert_status_ok();

    let record = &stored_records(&ctx).await[0];
    assert_eq!(record["browser"], "Safari");
    assert_eq!(record["device"], "Mobile");
}

#[tokio::test]
async fn test_track_only_accepts_post() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/track").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "Analytics API");
    assert_eq!(ctx.store.total_puts(), 0);
}
