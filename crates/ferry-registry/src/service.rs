use crate::config::{IndexMode, RegistryConfig};
use async_trait::async_trait;
use ferry_core::key::validate_user_id;
use ferry_core::{
    IndexEntry, IndexStore, KeyValueStore, ListedMapping, MappingKey, MappingPayload,
    MappingRecord, OwnerScope, Registry, RegistryError, StoreError,
};
use std::sync::Arc;
use tracing::{debug, trace, warn};

type Result<T> = std::result::Result<T, RegistryError>;

/// A concrete implementation of the [`Registry`] trait.
///
/// Records live in `store` under their [`MappingKey`]; enumeration goes
/// through `index`. A create writes the record first and the index entry
/// second, so a failure in between leaves an unlisted but resolvable record.
///
/// Note: neither the existence check nor the index update is atomic. Two
/// concurrent creates of the same key can both succeed, and two concurrent
/// creates in one scope can drop an index entry.
#[derive(Debug)]
pub struct MappingRegistry<S, I> {
    store: Arc<S>,
    index: Arc<I>,
    config: RegistryConfig,
}

impl<S, I> Clone for MappingRegistry<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            config: self.config.clone(),
        }
    }
}

fn index_error(scope: &OwnerScope, error: StoreError) -> RegistryError {
    match error {
        StoreError::InvalidData(reason) => RegistryError::CorruptIndex {
            key: scope.index_key(),
            reason,
        },
        other => RegistryError::Store(other),
    }
}

impl<S: KeyValueStore, I: IndexStore> MappingRegistry<S, I> {
    pub fn new(store: S, index: I, config: RegistryConfig) -> Self {
        Self {
            store: Arc::new(store),
            index: Arc::new(index),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The index list a record owned by `user_id` is appended to.
    fn scope_for(&self, user_id: &str) -> OwnerScope {
        match self.config.index_mode {
            IndexMode::PerUser => OwnerScope::user(user_id),
            IndexMode::Global => OwnerScope::Global,
        }
    }

    /// The index list that has to be read to enumerate `scope`.
    fn backing_scope(&self, scope: &OwnerScope) -> Result<OwnerScope> {
        if let OwnerScope::User(user_id) = scope {
            validate_user_id(user_id)?;
        }
        match (self.config.index_mode, scope) {
            (IndexMode::PerUser, OwnerScope::User(user_id)) => Ok(OwnerScope::user(user_id)),
            (IndexMode::PerUser, OwnerScope::Global) => Err(RegistryError::Validation(
                "listing all mappings requires the global index mode".to_string(),
            )),
            (IndexMode::Global, _) => Ok(OwnerScope::Global),
        }
    }

    fn validate(record: &MappingRecord) -> Result<MappingKey> {
        let key = MappingKey::new(&record.user_id, &record.custom_path)?;
        if let MappingPayload::UrlMapping { original_url } = &record.payload {
            if original_url.is_empty() {
                return Err(RegistryError::Validation(
                    "Original URL is required".to_string(),
                ));
            }
            url::Url::parse(original_url).map_err(|e| {
                RegistryError::Validation(format!("Invalid URL format: {original_url} ({e})"))
            })?;
        }
        Ok(key)
    }

    async fn read(&self, key: &MappingKey) -> Result<Option<MappingRecord>> {
        match self.store.get(key.as_str()).await? {
            Some(raw) => MappingRecord::from_json(&raw)
                .map(Some)
                .map_err(|e| RegistryError::from_record(key.as_str(), e)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S: KeyValueStore, I: IndexStore> Registry for MappingRegistry<S, I> {
    async fn create(&self, record: MappingRecord) -> Result<MappingKey> {
        let key = Self::validate(&record)?;
        trace!(key = %key, kind = %record.kind(), "creating mapping");

        if self.store.get(key.as_str()).await?.is_some() {
            debug!(key = %key, "Mapping already exists");
            return Err(RegistryError::Conflict(key.to_string()));
        }

        let raw = record
            .to_json()
            .map_err(|e| RegistryError::from_record(key.as_str(), e))?;
        self.store.put(key.as_str(), raw).await?;

        let scope = self.scope_for(&record.user_id);
        self.index
            .append(&scope, IndexEntry::for_record(&record))
            .await
            .map_err(|e| {
                warn!(key = %key, scope = %scope, error = %e, "Record stored but index append failed");
                index_error(&scope, e)
            })?;

        debug!(key = %key, scope = %scope, "Created mapping");
        Ok(key)
    }

    async fn get(&self, user_id: &str, custom_path: &str) -> Result<Option<MappingRecord>> {
        let key = MappingKey::encode(user_id, custom_path);
        trace!(key = %key, "looking up mapping");
        self.read(&key).await
    }

    async fn delete(&self, user_id: &str, custom_path: &str) -> Result<()> {
        // The index cleanup is scoped by `user_id`, so it must be the owner
        // the key decodes to.
        let key = MappingKey::new(user_id, custom_path)?;
        trace!(key = %key, "deleting mapping");

        if self.store.get(key.as_str()).await?.is_none() {
            return Err(RegistryError::NotFound(key.to_string()));
        }
        self.store.delete(key.as_str()).await?;

        let scope = self.scope_for(user_id);
        match self.index.remove(&scope, &key).await {
            Ok(true) => debug!(key = %key, scope = %scope, "Deleted mapping"),
            Ok(false) => debug!(key = %key, scope = %scope, "Deleted mapping with no index list"),
            Err(e) => warn!(
                key = %key,
                scope = %scope,
                error = %e,
                "Deleted mapping but failed to clean up its index entry"
            ),
        }
        Ok(())
    }

    async fn list(&self, scope: &OwnerScope) -> Result<Vec<ListedMapping>> {
        let backing = self.backing_scope(scope)?;
        let entries = self
            .index
            .entries(&backing)
            .await
            .map_err(|e| index_error(&backing, e))?;
        trace!(scope = %scope, entries = entries.len(), "listing mappings");

        let mut listed = Vec::with_capacity(entries.len());
        for entry in entries {
            if !scope.covers(&entry.mapping_key) {
                continue;
            }
            match self.store.get(entry.mapping_key.as_str()).await? {
                None => {
                    warn!(key = %entry.mapping_key, scope = %scope, "Skipping dangling index entry");
                }
                Some(raw) => {
                    let record = match MappingRecord::from_json(&raw) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!(key = %entry.mapping_key, error = %e, "Listing undecodable record");
                            None
                        }
                    };
                    listed.push(ListedMapping { entry, record });
                }
            }
        }
        Ok(listed)
    }

    async fn delete_all(&self, scope: &OwnerScope) -> Result<usize> {
        let backing = self.backing_scope(scope)?;
        let entries = self
            .index
            .entries(&backing)
            .await
            .map_err(|e| index_error(&backing, e))?;

        let (covered, remaining): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| scope.covers(&entry.mapping_key));

        for entry in &covered {
            self.store.delete(entry.mapping_key.as_str()).await?;
        }

        self.index
            .replace(&backing, remaining)
            .await
            .map_err(|e| index_error(&backing, e))?;

        debug!(scope = %scope, deleted = covered.len(), "Deleted all mappings in scope");
        Ok(covered.len())
    }
}
