use async_trait::async_trait;
use ferry_core::{IndexEntry, IndexStore, KeyValueStore, MappingKey, OwnerScope, StoreError};
use std::sync::Arc;
use tracing::{debug, trace};

type Result<T> = std::result::Result<T, StoreError>;

/// An [`IndexStore`] that keeps each scope's list as a JSON array under
/// [`OwnerScope::index_key`] in a plain key-value store.
///
/// Every mutation is a read-modify-write of the whole list; two concurrent
/// appends to the same scope can lose one of the entries.
#[derive(Debug)]
pub struct KvIndexStore<S> {
    store: Arc<S>,
}

impl<S> Clone for KvIndexStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> KvIndexStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn load(&self, index_key: &str) -> Result<Option<Vec<IndexEntry>>> {
        let Some(raw) = self.store.get(index_key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::InvalidData(format!("index list '{index_key}': {e}")))
    }

    async fn save(&self, index_key: &str, entries: &[IndexEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| StoreError::InvalidData(format!("index list '{index_key}': {e}")))?;
        self.store.put(index_key, raw).await
    }
}

#[async_trait]
impl<S: KeyValueStore> IndexStore for KvIndexStore<S> {
    async fn entries(&self, scope: &OwnerScope) -> Result<Vec<IndexEntry>> {
        let index_key = scope.index_key();
        trace!(scope = %scope, "Reading index list");
        Ok(self.load(&index_key).await?.unwrap_or_default())
    }

    async fn append(&self, scope: &OwnerScope, entry: IndexEntry) -> Result<()> {
        let index_key = scope.index_key();
        let mut entries = self.load(&index_key).await?.unwrap_or_default();
        entries.push(entry);
        self.save(&index_key, &entries).await?;
        debug!(scope = %scope, len = entries.len(), "Appended index entry");
        Ok(())
    }

    async fn remove(&self, scope: &OwnerScope, key: &MappingKey) -> Result<bool> {
        let index_key = scope.index_key();
        let Some(mut entries) = self.load(&index_key).await? else {
            return Ok(false);
        };
        let before = entries.len();
        entries.retain(|entry| &entry.mapping_key != key);
        self.save(&index_key, &entries).await?;
        debug!(
            scope = %scope,
            key = %key,
            removed = before - entries.len(),
            "Removed index entries"
        );
        Ok(true)
    }

    async fn replace(&self, scope: &OwnerScope, entries: Vec<IndexEntry>) -> Result<()> {
        let index_key = scope.index_key();
        self.save(&index_key, &entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use ferry_core::MappingRecord;

    fn entry(user_id: &str, custom_path: &str) -> IndexEntry {
        let created_at = "2024-05-01T10:00:00Z".parse().unwrap();
        IndexEntry::for_record(&MappingRecord::url(
            user_id,
            custom_path,
            "https://example.com",
            created_at,
        ))
    }

    fn index() -> (InMemoryStore, KvIndexStore<InMemoryStore>) {
        let store = InMemoryStore::new();
        let index = KvIndexStore::new(Arc::new(store.clone()));
        (store, index)
    }

    #[tokio::test]
    async fn missing_list_is_empty() {
        let (_, index) = index();
        assert!(index.entries(&OwnerScope::user("bob")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_keeps_insertion_order() {
        let (store, index) = index();
        let scope = OwnerScope::user("bob");

        index.append(&scope, entry("bob", "a")).await.unwrap();
        index.append(&scope, entry("bob", "b")).await.unwrap();

        let paths: Vec<_> = index
            .entries(&scope)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.custom_path)
            .collect();
        assert_eq!(paths, ["a", "b"]);
        assert!(store.get("user:bob:mappings:list").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_drops_matching_entries() {
        let (_, index) = index();
        let scope = OwnerScope::user("bob");
        index.append(&scope, entry("bob", "a")).await.unwrap();
        index.append(&scope, entry("bob", "b")).await.unwrap();

        let found = index
            .remove(&scope, &MappingKey::encode("bob", "a"))
            .await
            .unwrap();

        assert!(found);
        let entries = index.entries(&scope).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].custom_path, "b");
    }

    #[tokio::test]
    async fn remove_without_list_reports_missing() {
        let (store, index) = index();
        let found = index
            .remove(&OwnerScope::user("bob"), &MappingKey::encode("bob", "a"))
            .await
            .unwrap();

        assert!(!found);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn corrupt_list_is_invalid_data() {
        let (store, index) = index();
        store
            .put("user:bob:mappings:list", "not json".to_string())
            .await
            .unwrap();

        let err = index.entries(&OwnerScope::user("bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));

        let err = index
            .append(&OwnerScope::user("bob"), entry("bob", "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn replace_overwrites_list() {
        let (_, index) = index();
        index
            .append(&OwnerScope::Global, entry("bob", "a"))
            .await
            .unwrap();

        index.replace(&OwnerScope::Global, Vec::new()).await.unwrap();

        assert!(index.entries(&OwnerScope::Global).await.unwrap().is_empty());
    }
}
