//! Mock store for testing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use engine_core::{Error, Result, StoreErrorCode};
use kv_store::{KvStore, MemoryStore};
use parking_lot::Mutex;

/// Which store operation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Put,
    Get,
    List,
}

/// In-memory store that records writes and can be told to fail.
///
/// Behaves exactly like [`MemoryStore`] until a failure mode is set, so tests
/// go through the same production code paths as the real backends.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: MemoryStore,
    /// Number of `put` calls per key.
    puts: Arc<Mutex<BTreeMap<String, usize>>>,
    fail_on: Arc<Mutex<Option<FailOn>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear) the failure mode.
    pub fn set_fail_on(&self, op: Option<FailOn>) {
        *self.fail_on.lock() = op;
    }

    /// How many times `key` was written.
    pub fn put_count(&self, key: &str) -> usize {
        self.puts.lock().get(key).copied().unwrap_or(0)
    }

    /// Total writes to keys starting with `prefix`.
    pub fn puts_with_prefix(&self, prefix: &str) -> usize {
        self.puts
            .lock()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(_, n)| n)
            .sum()
    }

    /// Total writes of any key.
    pub fn total_puts(&self) -> usize {
        self.puts.lock().values().sum()
    }

    /// Write directly to the backing store without recording.
    pub async fn seed(&self, key: &str, value: &str) {
        self.inner
            .put(key, value, None)
            .await
            .expect("memory store put cannot fail");
    }

    fn check(&self, op: FailOn) -> Result<()> {
        if *self.fail_on.lock() == Some(op) {
            return Err(Error::store(
                StoreErrorCode::Unavailable,
                format!("mock store {op:?} failure"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MockStore {
    async fn put(&self, key: &str, value: &str, expire_after: Option<Duration>) -> Result<()> {
        self.check(FailOn::Put)?;
        *self.puts.lock().entry(key.to_string()).or_insert(0) += 1;
        self.inner.put(key, value, expire_after).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check(FailOn::Get)?;
        self.inner.get(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.check(FailOn::List)?;
        self.inner.list(prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_records_puts() {
        let mock = MockStore::new();
        mock.put("counter:page_view:all", "1", None).await.unwrap();
        mock.put("counter:page_view:all", "2", None).await.unwrap();
        mock.seed("event:1:a", "{}").await;

        assert_eq!(mock.put_count("counter:page_view:all"), 2);
        assert_eq!(mock.puts_with_prefix("event:"), 0);
        assert_eq!(mock.get("event:1:a").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_mock_store_failure_mode() {
        let mock = MockStore::new();
        mock.set_fail_on(Some(FailOn::List));

        assert!(mock.list("event:").await.unwrap_err().is_store());
        assert!(mock.put("k", "v", None).await.is_ok());

        mock.set_fail_on(None);
        assert!(mock.list("event:").await.is_ok());
    }
}
