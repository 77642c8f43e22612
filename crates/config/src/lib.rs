//! Engine configuration and persisted provider settings.
//!
//! Engine config files: `apiconf.toml`, `apiconf.yaml`, `apiconf.yml`, or
//! `apiconf.json`, searched in `./` then `~/.config/apiconf/`. String values
//! support `${ENV_VAR}` and `${ENV_VAR:-fallback}` substitution.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        config_dir, discover_and_load, find_config_file, load_config, load_provider_settings,
        save_provider_settings,
    },
    schema::{
        ApiconfConfig, CatalogConfig, HeaderMap, ProviderSettings, ReasoningEffort, ReconcileConfig,
        VsCodeLmSelector, non_empty,
    },
    validate::{CheckReport, Diagnostic, Severity},
};
