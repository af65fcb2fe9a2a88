use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::object_store::{ObjectStore, Result, StoreError};

/// One call observed by a [`MemoryObjectStore`], successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put {
        bucket: String,
        key: String,
        media_type: String,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

impl StoreCall {
    pub fn key(&self) -> &str {
        match self {
            StoreCall::Put { key, .. } | StoreCall::Delete { key, .. } => key,
        }
    }

    pub fn bucket(&self) -> &str {
        match self {
            StoreCall::Put { bucket, .. } | StoreCall::Delete { bucket, .. } => bucket,
        }
    }

    pub fn is_put(&self) -> bool {
        matches!(self, StoreCall::Put { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, StoreCall::Delete { .. })
    }
}

/// A stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub media_type: String,
}

#[derive(Default)]
struct State {
    objects: HashMap<(String, String), StoredObject>,
    calls: Vec<StoreCall>,
    failing_puts: HashSet<String>,
    failing_deletes: HashSet<String>,
}

/// An in-memory implementation of [`ObjectStore`], intended primarily for testing.
///
/// Records every call in issue order and can be told to fail puts or deletes
/// of specific keys. An optional latency keeps calls in flight long enough to
/// observe concurrency.
#[derive(Default)]
pub struct MemoryObjectStore {
    state: Mutex<State>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seed an existing object.
    pub fn insert(&self, bucket: &str, key: &str, body: &[u8], media_type: &str) {
        let mut state = self.state.lock().unwrap();
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: Bytes::copy_from_slice(body),
                media_type: media_type.to_string(),
            },
        );
    }

    /// Make puts of `key` fail.
    pub fn fail_put(&self, key: impl Into<String>) {
        self.state.lock().unwrap().failing_puts.insert(key.into());
    }

    /// Make deletes of `key` fail.
    pub fn fail_delete(&self, key: impl Into<String>) {
        self.state.lock().unwrap().failing_deletes.insert(key.into());
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.get(bucket, key).is_some()
    }

    /// All calls in the order they were issued.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that touched `key`, in issue order.
    pub fn calls_for(&self, key: &str) -> Vec<StoreCall> {
        self.calls().into_iter().filter(|c| c.key() == key).collect()
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, body: Bytes, media_type: &str) -> Result<()> {
        self.enter().await;
        let result = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StoreCall::Put {
                bucket: bucket.to_string(),
                key: key.to_string(),
                media_type: media_type.to_string(),
            });
            if state.failing_puts.contains(key) {
                Err(StoreError::failed("put", bucket, key, "injected failure"))
            } else {
                state.objects.insert(
                    (bucket.to_string(), key.to_string()),
                    StoredObject {
                        body,
                        media_type: media_type.to_string(),
                    },
                );
                Ok(())
            }
        };
        self.leave();
        result
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.enter().await;
        let result = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(StoreCall::Delete {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
            if state.failing_deletes.contains(key) {
                Err(StoreError::failed("delete", bucket, key, "injected failure"))
            } else {
                state
                    .objects
                    .remove(&(bucket.to_string(), key.to_string()));
                Ok(())
            }
        };
        self.leave();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryObjectStore::new();
        store
            .put("demo", "a.txt", Bytes::from_static(b"one"), "text/plain")
            .await
            .unwrap();
        store
            .put("demo", "a.txt", Bytes::from_static(b"two"), "text/plain")
            .await
            .unwrap();

        let object = store.get("demo", "a.txt").unwrap();
        assert_eq!(object.body, Bytes::from_static(b"two"));
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_key_succeeds() {
        let store = MemoryObjectStore::new();
        store.delete("demo", "nothing-here").await.unwrap();
        assert!(!store.contains("demo", "nothing-here"));
    }

    #[tokio::test]
    async fn test_buckets_are_separate() {
        let store = MemoryObjectStore::new();
        store.insert("demo", "a.txt", b"x", "text/plain");
        store.delete("demo-prod", "a.txt").await.unwrap();
        assert!(store.contains("demo", "a.txt"));
    }

    #[tokio::test]
    async fn test_injected_failures_are_recorded() {
        let store = MemoryObjectStore::new();
        store.fail_put("bad.txt");
        store.fail_delete("gone.txt");

        let put = store
            .put("demo", "bad.txt", Bytes::new(), "text/plain")
            .await;
        assert!(matches!(put, Err(StoreError::Failed { op: "put", .. })));
        assert!(!store.contains("demo", "bad.txt"));

        let delete = store.delete("demo", "gone.txt").await;
        assert!(delete.is_err());

        let calls = store.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_put());
        assert!(calls[1].is_delete());
    }
}
