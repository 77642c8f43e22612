//! Per-provider descriptor table.
//!
//! Every provider family stores its chosen model in a different settings
//! field. This table is the one place that knows which field, which default,
//! and where the provider's catalog comes from.

use {
    apiconf_common::ProviderName,
    apiconf_config::{ProviderSettings, VsCodeLmSelector, non_empty},
};

use crate::models;

/// Settings field holding the model identifier of a provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelField {
    ApiModelId,
    OpenRouterModelId,
    GlamaModelId,
    UnboundModelId,
    RequestyModelId,
    OpenAiModelId,
    OllamaModelId,
    LmStudioModelId,
    LiteLlmModelId,
    /// Derived as `vendor/family` from the VS Code selector.
    VsCodeLmSelector,
}

impl ModelField {
    /// The persisted settings key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ApiModelId => "apiModelId",
            Self::OpenRouterModelId => "openRouterModelId",
            Self::GlamaModelId => "glamaModelId",
            Self::UnboundModelId => "unboundModelId",
            Self::RequestyModelId => "requestyModelId",
            Self::OpenAiModelId => "openAiModelId",
            Self::OllamaModelId => "ollamaModelId",
            Self::LmStudioModelId => "lmStudioModelId",
            Self::LiteLlmModelId => "litellmModelId",
            Self::VsCodeLmSelector => "vsCodeLmModelSelector",
        }
    }

    /// Current value of this field, `None` when unset or blank.
    #[must_use]
    pub fn get(self, settings: &ProviderSettings) -> Option<String> {
        match self {
            Self::VsCodeLmSelector => settings
                .vs_code_lm_model_selector
                .as_ref()
                .and_then(selector_model_id),
            _ => non_empty(self.raw(settings)).map(str::to_string),
        }
    }

    /// The stored string, untrimmed. Always `None` for the selector field.
    #[must_use]
    pub fn raw(self, settings: &ProviderSettings) -> Option<&str> {
        match self {
            Self::ApiModelId => settings.api_model_id.as_deref(),
            Self::OpenRouterModelId => settings.open_router_model_id.as_deref(),
            Self::GlamaModelId => settings.glama_model_id.as_deref(),
            Self::UnboundModelId => settings.unbound_model_id.as_deref(),
            Self::RequestyModelId => settings.requesty_model_id.as_deref(),
            Self::OpenAiModelId => settings.open_ai_model_id.as_deref(),
            Self::OllamaModelId => settings.ollama_model_id.as_deref(),
            Self::LmStudioModelId => settings.lm_studio_model_id.as_deref(),
            Self::LiteLlmModelId => settings.litellm_model_id.as_deref(),
            Self::VsCodeLmSelector => None,
        }
    }

    /// Whether the field holds a plain string that can be written directly.
    #[must_use]
    pub fn is_plain_string(self) -> bool {
        !matches!(self, Self::VsCodeLmSelector)
    }
}

fn selector_model_id(selector: &VsCodeLmSelector) -> Option<String> {
    let vendor = non_empty(selector.vendor.as_deref())?;
    let family = non_empty(selector.family.as_deref())?;
    Some(format!("{vendor}/{family}"))
}

/// Where a provider's model catalog comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// Compiled-in table; model ids are validated against it.
    Static,
    /// Aggregator catalog fetched over the network; validated once loaded.
    Router,
    /// Listable but free-form; any id is accepted.
    Dynamic,
    /// Nothing to list.
    None,
}

impl CatalogKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Router => "router",
            Self::Dynamic => "dynamic",
            Self::None => "none",
        }
    }

    /// Whether switching to or editing this provider issues catalog fetches.
    #[must_use]
    pub fn is_fetched(self) -> bool {
        matches!(self, Self::Router | Self::Dynamic)
    }
}

/// One row of the provider table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub provider: ProviderName,
    pub display_name: &'static str,
    pub model_field: ModelField,
    /// Built-in default model id; `None` for providers without one.
    pub default_model_id: Option<&'static str>,
    /// Write the default into the model field when switching to this
    /// provider with the field unset.
    pub inject_default_on_switch: bool,
    pub catalog: CatalogKind,
    /// Free-form custom model info applies to this provider.
    pub supports_custom_info: bool,
}

/// Look up the descriptor of `provider`.
#[must_use]
pub fn descriptor(provider: ProviderName) -> ProviderDescriptor {
    use {CatalogKind as C, ModelField as F, ProviderName as P};

    let (display_name, model_field, catalog) = match provider {
        P::Anthropic => ("Anthropic", F::ApiModelId, C::Static),
        P::OpenRouter => ("OpenRouter", F::OpenRouterModelId, C::Router),
        P::Bedrock => ("Amazon Bedrock", F::ApiModelId, C::Static),
        P::Vertex => ("GCP Vertex AI", F::ApiModelId, C::Static),
        P::OpenAi => ("OpenAI Compatible", F::OpenAiModelId, C::Dynamic),
        P::Ollama => ("Ollama", F::OllamaModelId, C::Dynamic),
        P::LmStudio => ("LM Studio", F::LmStudioModelId, C::Dynamic),
        P::Gemini => ("Google Gemini", F::ApiModelId, C::Static),
        P::OpenAiNative => ("OpenAI", F::ApiModelId, C::Static),
        P::Mistral => ("Mistral", F::ApiModelId, C::Static),
        P::DeepSeek => ("DeepSeek", F::ApiModelId, C::Static),
        P::VsCodeLm => ("VS Code LM API", F::VsCodeLmSelector, C::Dynamic),
        P::Unbound => ("Unbound", F::UnboundModelId, C::Router),
        P::Requesty => ("Requesty", F::RequestyModelId, C::Router),
        P::HumanRelay => ("Human Relay", F::ApiModelId, C::None),
        P::Glama => ("Glama", F::GlamaModelId, C::Router),
        P::XAi => ("xAI (Grok)", F::ApiModelId, C::Static),
        P::Groq => ("Groq", F::ApiModelId, C::Static),
        P::Chutes => ("Chutes AI", F::ApiModelId, C::Static),
        P::LiteLlm => ("LiteLLM", F::LiteLlmModelId, C::Dynamic),
    };

    ProviderDescriptor {
        provider,
        display_name,
        model_field,
        default_model_id: builtin_default_model_id(provider),
        inject_default_on_switch: catalog == C::Router,
        catalog,
        supports_custom_info: provider == P::OpenAi,
    }
}

/// The provider table in display order.
#[must_use]
pub fn known_providers() -> Vec<ProviderDescriptor> {
    let mut table: Vec<_> = ProviderName::ALL.into_iter().map(descriptor).collect();
    table.sort_by_key(|d| d.display_name);
    table
}

/// Built-in default model id of `provider`.
#[must_use]
pub fn builtin_default_model_id(provider: ProviderName) -> Option<&'static str> {
    use ProviderName as P;

    match provider {
        P::Anthropic => Some("claude-3-7-sonnet-20250219"),
        P::OpenRouter => Some("anthropic/claude-3.7-sonnet"),
        P::Bedrock => Some("anthropic.claude-3-7-sonnet-20250219-v1:0"),
        P::Vertex => Some("claude-3-7-sonnet@20250219"),
        P::Gemini => Some("gemini-2.0-flash-001"),
        P::OpenAiNative => Some("gpt-4.1"),
        P::Mistral => Some("codestral-latest"),
        P::DeepSeek => Some("deepseek-chat"),
        P::Unbound => Some("anthropic/claude-3-7-sonnet-20250219"),
        P::Requesty => Some("coding/claude-3-7-sonnet"),
        P::Glama => Some("anthropic/claude-3-7-sonnet"),
        P::XAi => Some("grok-3"),
        P::Groq => Some("llama-3.3-70b-versatile"),
        P::Chutes => Some("deepseek-ai/DeepSeek-R1"),
        P::LiteLlm => Some(models::LITELLM_DEFAULT_MODEL_ID),
        P::OpenAi | P::Ollama | P::LmStudio | P::VsCodeLm | P::HumanRelay => None,
    }
}
