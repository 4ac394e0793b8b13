use crate::error::StoreError;
use crate::key::MappingKey;
use crate::record::{MappingKind, MappingRecord};
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

type Result<T> = std::result::Result<T, StoreError>;

const GLOBAL_INDEX_KEY: &str = "mappings:list";

/// The grouping an index list is maintained for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerScope {
    /// One list per user id.
    User(String),
    /// A single list holding every mapping.
    Global,
}

impl OwnerScope {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User(user_id.into())
    }

    /// The store key holding this scope's index list.
    ///
    /// Neither form is a well-formed mapping key, so index lists never
    /// collide with records.
    pub fn index_key(&self) -> String {
        match self {
            OwnerScope::User(user_id) => format!("user:{user_id}:mappings:list"),
            OwnerScope::Global => GLOBAL_INDEX_KEY.to_string(),
        }
    }

    /// Whether a mapping key belongs to this scope.
    pub fn covers(&self, key: &MappingKey) -> bool {
        match self {
            OwnerScope::User(user_id) => key.user_id() == Some(user_id.as_str()),
            OwnerScope::Global => true,
        }
    }
}

impl Display for OwnerScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerScope::User(user_id) => write!(f, "user:{user_id}"),
            OwnerScope::Global => f.write_str("global"),
        }
    }
}

/// A lightweight pointer to a record, kept in an index list for enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub mapping_key: MappingKey,
    pub custom_path: String,
    pub created_at: Timestamp,
    #[serde(rename = "type")]
    pub kind: MappingKind,
}

impl IndexEntry {
    pub fn for_record(record: &MappingRecord) -> Self {
        Self {
            mapping_key: record.key(),
            custom_path: record.custom_path.clone(),
            created_at: record.created_at,
            kind: record.kind(),
        }
    }
}

/// Storage for per-scope index lists.
///
/// Implementations backed by a plain key-value store perform
/// read-modify-write cycles and can lose concurrent updates to the same
/// scope. A backend with atomic append or conditional writes can implement
/// this trait without touching the registry.
#[async_trait]
pub trait IndexStore: Send + Sync + 'static {
    /// Returns the scope's entries in insertion order.
    /// A missing list is an empty list.
    async fn entries(&self, scope: &OwnerScope) -> Result<Vec<IndexEntry>>;

    /// Appends an entry at the end of the scope's list.
    async fn append(&self, scope: &OwnerScope, entry: IndexEntry) -> Result<()>;

    /// Removes every entry pointing at `key`.
    ///
    /// Returns `false` when the scope has no list at all.
    async fn remove(&self, scope: &OwnerScope, key: &MappingKey) -> Result<bool>;

    /// Overwrites the scope's list.
    async fn replace(&self, scope: &OwnerScope, entries: Vec<IndexEntry>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keys() {
        assert_eq!(
            OwnerScope::user("bob").index_key(),
            "user:bob:mappings:list"
        );
        assert_eq!(OwnerScope::Global.index_key(), "mappings:list");
    }

    #[test]
    fn scope_coverage() {
        let key = MappingKey::encode("bob", "a");
        assert!(OwnerScope::Global.covers(&key));
        assert!(OwnerScope::user("bob").covers(&key));
        assert!(!OwnerScope::user("alice").covers(&key));
    }

    #[test]
    fn entry_wire_shape() {
        let created_at: Timestamp = "2024-05-01T10:00:00Z".parse().unwrap();
        let record = MappingRecord::url("bob", "a", "https://example.com", created_at);
        let entry = IndexEntry::for_record(&record);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "mappingKey": "user:bob:path:a",
                "customPath": "a",
                "createdAt": "2024-05-01T10:00:00Z",
                "type": "url_mapping",
            })
        );
    }
}
