//! In-memory store backed by a `BTreeMap`.
//!
//! Expired entries are invisible to `get` and `list` immediately; memory is
//! reclaimed by [`KvStore::purge_expired`], which the worker calls on a timer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine_core::Result;
use parking_lot::RwLock;

use crate::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Shared in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

fn expiry(now: DateTime<Utc>, expire_after: Option<Duration>) -> Option<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(expire_after?).ok()?;
    now.checked_add_signed(ttl)
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, expire_after: Option<Duration>) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: expiry(Utc::now(), expire_after),
        };
        self.data.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        Ok(self
            .data
            .read()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Utc::now();
        let data = self.data.read();
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut data = self.data.write();
        let before = data.len();
        data.retain(|_, e| e.is_live(now));
        Ok(before - data.len())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
