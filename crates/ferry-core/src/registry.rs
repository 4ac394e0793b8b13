use crate::error::RegistryError;
use crate::index::{IndexEntry, OwnerScope};
use crate::key::MappingKey;
use crate::record::MappingRecord;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, RegistryError>;

/// One row of a listing: the index entry and, when it could be decoded, the
/// record it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedMapping {
    pub entry: IndexEntry,
    /// `None` when the record exists but could not be decoded.
    pub record: Option<MappingRecord>,
}

/// Create, read and delete operations over mapping records and their indexes.
///
/// Each operation is atomic per record but not across a record and its index
/// entry.
#[async_trait]
pub trait Registry: Send + Sync + 'static {
    /// Stores a new record and indexes it.
    ///
    /// Fails with [`RegistryError::Conflict`] if the key is taken; existing
    /// records are never overwritten.
    async fn create(&self, record: MappingRecord) -> Result<MappingKey>;

    /// Looks up a record. Returns `None` if the key does not exist.
    async fn get(&self, user_id: &str, custom_path: &str) -> Result<Option<MappingRecord>>;

    /// Deletes a record and its index entry.
    ///
    /// Fails with [`RegistryError::NotFound`] if the record does not exist.
    async fn delete(&self, user_id: &str, custom_path: &str) -> Result<()>;

    /// Lists a scope's mappings in index order, skipping dangling entries.
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<ListedMapping>>;

    /// Deletes every mapping indexed under `scope`, returning how many record
    /// keys were deleted. There is no rollback on partial failure.
    async fn delete_all(&self, scope: &OwnerScope) -> Result<usize>;
}
