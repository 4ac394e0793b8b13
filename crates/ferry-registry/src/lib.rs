//! Mapping registry service.
//!
//! This crate provides [`MappingRegistry`], the create/get/delete/list
//! protocol over a [`ferry_core::KeyValueStore`] and an
//! [`ferry_core::IndexStore`]. Core types are re-exported from `ferry_core`.

pub mod config;
pub mod service;

pub use config::{IndexMode, RegistryConfig};
pub use ferry_core::{ListedMapping, Registry, RegistryError};
pub use service::MappingRegistry;
