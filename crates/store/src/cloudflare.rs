//! Cloudflare Workers KV backend over the REST API.
//!
//! Endpoints (relative to `api_base_url`):
//! - `PUT  /accounts/{account}/storage/kv/namespaces/{ns}/values/{key}?expiration_ttl=N`
//! - `GET  /accounts/{account}/storage/kv/namespaces/{ns}/values/{key}`
//! - `GET  /accounts/{account}/storage/kv/namespaces/{ns}/keys?prefix=&limit=&cursor=`

use std::time::Duration;

use async_trait::async_trait;
use engine_core::{Error, Result, StoreErrorCode};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{required, StoreConfig};
use crate::KvStore;

/// Workers KV rejects expirations shorter than a minute.
const MIN_EXPIRATION_TTL_SECS: u64 = 60;

const MIN_LIST_LIMIT: u32 = 10;
const MAX_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
struct ListKeysResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Vec<KeyEntry>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct KeyEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    cursor: Option<String>,
}

/// Workers KV namespace client.
#[derive(Debug, Clone)]
pub struct CloudflareKvStore {
    client: Client,
    namespace_url: Url,
    api_token: String,
    list_limit: u32,
}

fn unavailable(e: impl std::fmt::Display) -> Error {
    Error::store(StoreErrorCode::Unavailable, e.to_string())
}

impl CloudflareKvStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let account_id = required(&config.account_id, "account_id")?;
        let namespace_id = required(&config.namespace_id, "namespace_id")?;
        let api_token = required(&config.api_token, "api_token")?;

        let mut namespace_url = Url::parse(&config.api_base_url)
            .map_err(|e| Error::config(format!("store.api_base_url: {e}")))?;
        namespace_url
            .path_segments_mut()
            .map_err(|_| Error::config("store.api_base_url cannot be a base URL"))?
            .pop_if_empty()
            .extend([
                "accounts",
                account_id,
                "storage",
                "kv",
                "namespaces",
                namespace_id,
            ]);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            namespace_url,
            api_token: api_token.to_string(),
            list_limit: config.list_page_size.clamp(MIN_LIST_LIMIT, MAX_LIST_LIMIT),
        })
    }

    /// URL of a single value. The key is percent-encoded as one path segment.
    fn value_url(&self, key: &str) -> Url {
        let mut url = self.namespace_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(["values", key]);
        }
        url
    }

    fn keys_url(&self) -> Url {
        let mut url = self.namespace_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("keys");
        }
        url
    }

    async fn reject(op: &str, key: &str, resp: Response) -> Error {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        warn!(op, key, status = %status, "Workers KV request rejected");
        Error::store(
            StoreErrorCode::Rejected,
            format!("{op} {key}: {status} {body}"),
        )
    }
}

#[async_trait]
impl KvStore for CloudflareKvStore {
    async fn put(&self, key: &str, value: &str, expire_after: Option<Duration>) -> Result<()> {
        let mut request = self
            .client
            .put(self.value_url(key))
            .bearer_auth(&self.api_token)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(value.to_string());

        if let Some(ttl) = expire_after {
            let secs = ttl.as_secs().max(MIN_EXPIRATION_TTL_SECS);
            request = request.query(&[("expiration_ttl", secs)]);
        }

        let resp = request.send().await.map_err(unavailable)?;
        if !resp.status().is_success() {
            return Err(Self::reject("PUT", key, resp).await);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let resp = self
            .client
            .get(self.value_url(key))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(unavailable)?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => resp.text().await.map(Some).map_err(unavailable),
            _ => Err(Self::reject("GET", key, resp).await),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;
        let limit = self.list_limit.to_string();

        loop {
            let mut query = vec![("prefix", prefix), ("limit", limit.as_str())];
            if let Some(c) = cursor.as_deref() {
                query.push(("cursor", c));
            }

            let resp = self
                .client
                .get(self.keys_url())
                .bearer_auth(&self.api_token)
                .query(&query)
                .send()
                .await
                .map_err(unavailable)?;

            if !resp.status().is_success() {
                return Err(Self::reject("LIST", prefix, resp).await);
            }

            let page: ListKeysResponse = resp.json().await.map_err(unavailable)?;
            if !page.success {
                let detail = page
                    .errors
                    .iter()
                    .map(|e| format!("{} ({})", e.message, e.code.unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(Error::store(
                    StoreErrorCode::Rejected,
                    format!("LIST {prefix}: {detail}"),
                ));
            }

            let page_len = page.result.len();
            keys.extend(page.result.into_iter().map(|k| k.name));

            let next = page
                .result_info
                .and_then(|info| info.cursor)
                .filter(|c| !c.is_empty());
            debug!(prefix, page_len, has_more = next.is_some(), "Listed key page");

            match next {
                Some(c) if cursor.as_deref() != Some(c.as_str()) => cursor = Some(c),
                _ => break,
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "cloudflare"
    }
}
