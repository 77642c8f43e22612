//! Shared types and error definitions used across all apiconf crates.

pub mod error;
pub mod types;

pub use {
    error::{Error, FromMessage, Result},
    types::{CatalogSnapshot, CustomModelInfo, ModelCatalog, ModelInfo, ProviderName},
};
