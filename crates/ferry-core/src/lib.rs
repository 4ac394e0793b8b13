//! Core types and traits for the Ferry content redirector.
//!
//! This crate provides the mapping key codec, the persisted record schema,
//! the index entry model and the async trait seams shared by the storage,
//! registry, resolver and gateway crates.

pub mod content_type;
pub mod error;
pub mod index;
pub mod key;
pub mod record;
pub mod registry;
pub mod store;

pub use content_type::infer_content_type;
pub use error::{KeyError, RecordError, RegistryError, StoreError};
pub use index::{IndexEntry, IndexStore, OwnerScope};
pub use key::MappingKey;
pub use record::{MappingKind, MappingPayload, MappingRecord};
pub use registry::{ListedMapping, Registry};
pub use store::KeyValueStore;
