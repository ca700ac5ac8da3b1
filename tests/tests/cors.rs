//! CORS headers and the fallback banner.

use axum::http::{Method, StatusCode};
use axum_test::TestResponse;
use integration_tests::{
    fixtures,
    mocks::FailOn,
    setup::{TestContext, TEST_BANNER, TEST_ORIGIN},
};

fn assert_cors(response: &TestResponse) {
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        TEST_ORIGIN
    );
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        headers.get("access-control-allow-headers").unwrap(),
        "Content-Type"
    );
}

#[tokio::test]
async fn test_options_on_any_path() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for path in ["/track", "/stats", "/", "/some/other/path"] {
        let response = server.method(Method::OPTIONS, path).await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().is_empty());
        assert_cors(&response);
    }
    assert_eq!(ctx.store.total_puts(), 0);
}

#[tokio::test]
async fn test_success_responses_carry_cors() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let track = server
        .post("/track")
        .json(&fixtures::event("page_view", None))
        .await;
    assert_cors(&track);

    let stats = server.get("/stats").await;
    assert_cors(&stats);
}

#[tokio::test]
async fn test_error_responses_carry_cors() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let bad = server.post("/track").text("nope").await;
    bad.assert_status(StatusCode::BAD_REQUEST);
    assert_cors(&bad);

    ctx.store.set_fail_on(Some(FailOn::List));
    let failed = server.get("/stats").await;
    failed.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors(&failed);
}

#[tokio::test]
async fn test_unknown_route_returns_banner() {
    let ctx = TestContext::new();
    let server = ctx.server();

    for response in [
        server.get("/").await,
        server.get("/favicon.ico").await,
        server.put("/track").await,
        server.delete("/stats").await,
    ] {
        response.assert_status_ok();
        assert_eq!(response.text(), TEST_BANNER);
        assert_cors(&response);
    }
}
