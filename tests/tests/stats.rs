//! End-to-end tests for `GET /stats`.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

#[tokio::test]
async fn test_empty_store_snapshot() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/stats").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "pageViews": 0,
            "uniqueVisitors": 0,
            "versionSelections": {},
            "installClicks": {},
            "installSuccess": {},
            "installFailed": {},
            "dailyStats": {},
            "monthlyStats": {},
            "hourlyStats": {},
            "weekdayStats": {},
            "countries": {},
            "browsers": {},
            "devices": {},
            "referrers": {},
            "conversionRate": "0.0",
            "geographicReach": 0,
            "avgTimeOnPage": 0
        })
    );
}

#[tokio::test]
async fn test_timestamp_buckets() {
    let ctx = TestContext::new();
    ctx.store
        .seed(
            "event:1710513000000:abc123def",
            &fixtures::stored_event("page_view", "2024-03-15T14:30:00.000Z", json!({})),
        )
        .await;

    let body: Value = ctx.server().get("/stats").await.json();

    assert_eq!(body["dailyStats"]["2024-03-15"], 1);
    assert_eq!(body["hourlyStats"]["14"], 1);
    assert_eq!(body["weekdayStats"]["5"], 1);
    assert_eq!(body["monthlyStats"]["2024-03"], 1);
    assert_eq!(body["referrers"]["Direct"], 1);
    assert_eq!(body["countries"]["Unknown"], 1);
}

#[tokio::test]
async fn test_conversion_rate_from_counters() {
    let ctx = TestContext::new();
    ctx.store.seed("counter:install_click:v1", "10").await;
    ctx.store.seed("counter:page_view:all", "200").await;
    ctx.store.seed("counter:install_success:v1", "7").await;
    ctx.store.seed("counter:install_failed:v1", "3").await;
    ctx.store.seed("counter:version_selected:v1", "25").await;

    let body: Value = ctx.server().get("/stats").await.json();

    assert_eq!(body["pageViews"], 200);
    assert_eq!(body["installClicks"], json!({ "v1": 10 }));
    assert_eq!(body["installSuccess"], json!({ "v1": 7 }));
    assert_eq!(body["installFailed"], json!({ "v1": 3 }));
    assert_eq!(body["versionSelections"], json!({ "v1": 25 }));
    assert_eq!(body["conversionRate"], "5.0");
}

#[tokio::test]
async fn test_malformed_record_is_skipped() {
    let ctx = TestContext::new();
    for i in 0..9 {
        ctx.store
            .seed(
                &format!("event:171051300000{i}:aaaaaaaa{i}"),
                &fixtures::stored_event(
                    "page_view",
                    "2024-03-15T14:30:00.000Z",
                    json!({ "country": "US" }),
                ),
            )
            .await;
    }
    ctx.store.seed("event:1710513000099:broken000", "{not json").await;

    let response = ctx.server().get("/stats").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["dailyStats"]["2024-03-15"], 9);
    assert_eq!(body["countries"], json!({ "US": 9 }));
}

#[tokio::test]
async fn test_track_then_stats_round_trip() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for (ua, visitor) in [
        (fixtures::CHROME_DESKTOP, "a"),
        (fixtures::EDGE_DESKTOP, "b"),
        (fixtures::SAFARI_IPHONE, "a"),
    ] {
        server
            .post("/track")
            .add_header("User-Agent", ua)
            .add_header("CF-IPCountry", "GB")
            .json(&fixtures::page_view(Some(visitor)))
            .await
            .assert_status_ok();
    }
    server
        .post("/track")
        .json(&fixtures::event("install_click", Some("v2")))
        .await
        .assert_status_ok();

    let body: Value = server.get("/stats").await.json();

    assert_eq!(body["pageViews"], 3);
    assert_eq!(body["uniqueVisitors"], 2);
    assert_eq!(body["installClicks"], json!({ "v2": 1 }));
    assert_eq!(body["conversionRate"], "33.3");
    assert_eq!(body["browsers"], json!({ "Chrome": 1, "Edge": 1, "Safari": 1, "Unknown": 1 }));
    assert_eq!(body["devices"], json!({ "Desktop": 2, "Mobile": 1, "Unknown": 1 }));
    assert_eq!(body["countries"], json!({ "GB": 3, "Unknown": 1 }));
    assert_eq!(body["geographicReach"], 2);
    assert_eq!(body["referrers"], json!({ "https://github.com": 3 }));
    assert_eq!(body["avgTimeOnPage"], 42);
}

#[tokio::test]
async fn test_stats_other_methods_get_banner() {
    let ctx = TestContext::new();
    let response = ctx.server().post("/stats").await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.text(), "Analytics API");
}
