//! Derive the effective `(provider, model id, model info)` from settings.

use {
    apiconf_common::{CatalogSnapshot, ModelInfo, ProviderName},
    apiconf_config::ProviderSettings,
    apiconf_providers::{
        CUSTOM_ARN_MODEL_ID, custom_arn_model_info, descriptor, sane_defaults, static_catalog,
    },
    serde::Serialize,
};

/// Where the model info of a selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelSource {
    /// Fetched or compiled-in catalog entry.
    Catalog,
    /// User override of a free-form model.
    CustomOverride,
    /// Provider fallback record.
    SaneDefault,
    /// Custom resource locator; no catalog entry exists by construction.
    CustomLocator,
}

impl ModelSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::CustomOverride => "custom-override",
            Self::SaneDefault => "sane-default",
            Self::CustomLocator => "custom-locator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub provider: ProviderName,
    /// Empty when the provider has no default and nothing is chosen.
    pub model_id: String,
    pub model_info: ModelInfo,
    pub source: ModelSource,
}

/// Whether `model_id` is the custom-locator entry of `provider`.
#[must_use]
pub fn is_custom_locator(provider: ProviderName, model_id: &str) -> bool {
    provider == ProviderName::Bedrock && model_id == CUSTOM_ARN_MODEL_ID
}

/// Resolve the current selection. Pure; recompute on every change.
#[must_use]
pub fn select(settings: &ProviderSettings, catalogs: &CatalogSnapshot) -> Selection {
    let provider = settings.provider();
    let d = descriptor(provider);
    let model_id = d
        .model_field
        .get(settings)
        .or_else(|| d.default_model_id.map(str::to_string))
        .unwrap_or_default();

    let (model_info, source) = if is_custom_locator(provider, &model_id) {
        (custom_arn_model_info(), ModelSource::CustomLocator)
    } else if d.supports_custom_info {
        match &settings.open_ai_custom_model_info {
            Some(custom) => (
                custom.resolve(&sane_defaults(provider)),
                ModelSource::CustomOverride,
            ),
            None => (sane_defaults(provider), ModelSource::SaneDefault),
        }
    } else {
        match lookup(provider, &model_id, catalogs) {
            Some(info) => (info.clone(), ModelSource::Catalog),
            None => (sane_defaults(provider), ModelSource::SaneDefault),
        }
    };

    Selection {
        provider,
        model_id,
        model_info,
        source,
    }
}

/// Fetched catalog first, then the compiled-in one.
fn lookup<'a>(
    provider: ProviderName,
    model_id: &str,
    catalogs: &'a CatalogSnapshot,
) -> Option<&'a ModelInfo> {
    catalogs
        .get(&provider)
        .and_then(|catalog| catalog.get(model_id))
        .or_else(|| static_catalog(provider).get(model_id))
}
