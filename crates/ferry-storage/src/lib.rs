//! Key-value store backends and the index list store built on top of them.

pub mod index;
pub mod memory;
pub mod redis;

pub use ferry_core::{IndexStore, KeyValueStore, StoreError};
pub use index::KvIndexStore;
pub use memory::InMemoryStore;
pub use self::redis::RedisStore;
