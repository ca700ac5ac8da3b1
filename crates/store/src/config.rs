//! Store configuration and backend construction.

use std::str::FromStr;
use std::sync::Arc;

use engine_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CloudflareKvStore, KvStore, MemoryStore};

/// Which backend holds the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; lost on restart
    #[default]
    Memory,
    /// Cloudflare Workers KV over its REST API
    Cloudflare,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "cloudflare" => Ok(Self::Cloudflare),
            other => Err(Error::config(format!(
                "unknown store backend '{other}' (expected memory or cloudflare)"
            ))),
        }
    }
}

/// Key-value store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Cloudflare account ID
    pub account_id: Option<String>,
    /// Workers KV namespace ID
    pub namespace_id: Option<String>,
    /// API token with Workers KV edit permission
    pub api_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Keys requested per list page
    #[serde(default = "default_list_page_size")]
    pub list_page_size: u32,
    /// Maximum concurrent point reads during aggregation
    #[serde(default = "default_read_concurrency")]
    pub read_concurrency: usize,
}

fn default_api_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_list_page_size() -> u32 {
    1000
}

fn default_read_concurrency() -> usize {
    16
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            account_id: None,
            namespace_id: None,
            api_token: None,
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            list_page_size: default_list_page_size(),
            read_concurrency: default_read_concurrency(),
        }
    }
}

/// Build the configured backend.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Cloudflare => Arc::new(CloudflareKvStore::new(config)?),
    };

    info!(backend = store.backend_name(), "Key-value store ready");
    Ok(store)
}

pub(crate) fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("store.{name} is required for the cloudflare backend")))
}
