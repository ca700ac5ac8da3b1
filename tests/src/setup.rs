//! Common test setup functions.

use std::sync::Arc;

use api::{router, state::AppState};
use axum::Router;
use axum_test::TestServer;
use kv_store::KvStore;

use crate::mocks::MockStore;

pub const TEST_ORIGIN: &str = "https://dashboard.example";
pub const TEST_BANNER: &str = "Analytics API";

/// Test context with the real router over a mock store.
///
/// - Uses the real Axum router with all middleware
/// - Uses MockStore, which implements KvStore over an in-memory map
pub struct TestContext {
    pub store: Arc<MockStore>,
    pub router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MockStore::new());
        let state = AppState::new(
            store.clone() as Arc<dyn KvStore>,
            TEST_ORIGIN,
            TEST_BANNER,
        )
        .expect("Failed to build app state")
        .with_read_concurrency(4);

        Self {
            store,
            router: router(state),
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
