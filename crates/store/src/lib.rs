//! Key-value storage for the analytics service.
//!
//! The [`KvStore`] trait is the only thing the write path ([`insert`]) and the
//! read path ([`query`]) depend on. Two backends implement it: an in-process
//! map with expiry and the Cloudflare Workers KV REST API.

pub mod cloudflare;
pub mod config;
pub mod insert;
pub mod memory;
pub mod query;

use std::time::Duration;

use async_trait::async_trait;
use engine_core::Result;

pub use cloudflare::CloudflareKvStore;
pub use config::*;
pub use insert::{track_event, TrackOutcome};
pub use memory::MemoryStore;
pub use query::{collect_stats, ScanSummary};

/// A string key-value store with per-key expiry.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Write `value` under `key`. `None` means the key never expires.
    async fn put(&self, key: &str, value: &str, expire_after: Option<Duration>) -> Result<()>;

    /// Read a key. Expired and missing keys are both `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Every live key starting with `prefix`, sorted, across all pages.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Drop expired entries. Backends that expire keys themselves return 0.
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }

    fn backend_name(&self) -> &'static str;
}
