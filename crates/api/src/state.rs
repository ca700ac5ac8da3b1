//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderValue;
use engine_core::{Error, Result};
use kv_store::KvStore;

/// Default number of concurrent point reads during aggregation.
pub const DEFAULT_READ_CONCURRENCY: usize = 16;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Key-value store (Workers KV in production, memory or mocks in tests)
    pub store: Arc<dyn KvStore>,
    /// Value of `Access-Control-Allow-Origin` on every response
    pub allowed_origin: HeaderValue,
    /// Plaintext body for unknown routes
    pub banner: Arc<str>,
    /// Concurrent point reads per `/stats` request
    pub read_concurrency: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        allowed_origin: &str,
        banner: impl Into<Arc<str>>,
    ) -> Result<Self> {
        let allowed_origin = HeaderValue::from_str(allowed_origin)
            .map_err(|e| Error::config(format!("allowed_origin: {e}")))?;

        Ok(Self {
            store,
            allowed_origin,
            banner: banner.into(),
            read_concurrency: DEFAULT_READ_CONCURRENCY,
        })
    }

    pub fn with_read_concurrency(mut self, read_concurrency: usize) -> Self {
        self.read_concurrency = read_concurrency.max(1);
        self
    }
}
