use crate::error::StoreError;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, StoreError>;

/// An opaque asynchronous string-to-string store.
///
/// There are no transactions, no conditional writes and no enumeration;
/// listing is built on explicit index records (see [`crate::IndexStore`]).
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value under `key`, or `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn put(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. It is not an error if the key does not exist.
    async fn delete(&self, key: &str) -> Result<()>;
}
