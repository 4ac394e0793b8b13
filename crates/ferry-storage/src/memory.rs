use async_trait::async_trait;
use dashmap::DashMap;
use ferry_core::{KeyValueStore, StoreError};
use std::sync::Arc;

type Result<T> = std::result::Result<T, StoreError>;

/// In-memory implementation of [`KeyValueStore`] using DashMap.
///
/// Clones share the same underlying map, so one instance can back both the
/// record store and the index store of a registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    storage: Arc<DashMap<String, String>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.storage.get(key).map(|value| value.clone()))
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        self.storage.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryStore::new();

        store.put("user:bob:path:a", "v1".to_string()).await.unwrap();

        let value = store.get("user:bob:path:a").await.unwrap();
        assert_eq!(value.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let store = InMemoryStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = InMemoryStore::new();

        store.put("k", "v1".to_string()).await.unwrap();
        store.put("k", "v2".to_string()).await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryStore::new();

        store.put("k", "v".to_string()).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();

        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryStore::new();
        let other = store.clone();

        store.put("k", "v".to_string()).await.unwrap();

        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(other.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_access() {
        let store = InMemoryStore::new();
        let mut handles = vec![];

        for i in 0..10u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .put(&format!("key-{i:03}"), format!("value-{i}"))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..10u64 {
            let value = store.get(&format!("key-{i:03}")).await.unwrap();
            assert_eq!(value, Some(format!("value-{i}")));
        }
    }
}
