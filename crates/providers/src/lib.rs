//! Provider knowledge: the descriptor table, static model catalogs, fallback
//! capability records, and catalog fetching over HTTP.

pub mod error;
pub mod fetch;
pub mod models;
pub mod registry;

pub use {
    error::{Error, Result},
    fetch::{CatalogFetcher, ConnectionParams, HttpCatalogFetcher, connection_params},
    models::{CUSTOM_ARN_MODEL_ID, custom_arn_model_info, sane_defaults, static_catalog},
    registry::{
        CatalogKind, ModelField, ProviderDescriptor, builtin_default_model_id, descriptor,
        known_providers,
    },
};

/// Shared HTTP client for catalog requests.
///
/// Fetchers that don't need a custom timeout reuse this client to share
/// connection pools, DNS cache, and TLS sessions.
pub fn shared_http_client() -> &'static reqwest::Client {
    static CLIENT: std::sync::LazyLock<reqwest::Client> =
        std::sync::LazyLock::new(reqwest::Client::new);
    &CLIENT
}
