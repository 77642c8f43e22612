//! Config schema types: the engine's own settings file and the persisted
//! provider settings record it reconciles.

use {
    apiconf_common::{CustomModelInfo, ProviderName},
    indexmap::IndexMap,
    serde::{Deserialize, Serialize},
};

/// Custom request headers, kept in the order they were first inserted.
pub type HeaderMap = IndexMap<String, String>;

/// Root configuration (`apiconf.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiconfConfig {
    pub reconcile: ReconcileConfig,
    pub catalog: CatalogConfig,
}

/// Debounce windows of the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Quiet period before the header edit buffer is committed. Defaults to 300.
    pub header_commit_debounce_ms: u64,
    /// Quiet period before a catalog refresh is issued. Defaults to 250.
    pub catalog_refresh_debounce_ms: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            header_commit_debounce_ms: 300,
            catalog_refresh_debounce_ms: 250,
        }
    }
}

/// Endpoints used by the HTTP catalog fetcher.
///
/// Local backends fall back to these base URLs when the provider settings
/// leave theirs empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Per-request timeout in seconds. Defaults to 15.
    pub request_timeout_secs: u64,
    pub openrouter_url: String,
    pub requesty_url: String,
    pub glama_url: String,
    pub unbound_url: String,
    pub litellm_url: String,
    pub ollama_url: String,
    pub lmstudio_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 15,
            openrouter_url: "https://openrouter.ai/api/v1".into(),
            requesty_url: "https://router.requesty.ai/v1".into(),
            glama_url: "https://glama.ai/api/gateway/v1".into(),
            unbound_url: "https://api.getunbound.ai".into(),
            litellm_url: "http://localhost:4000".into(),
            ollama_url: "http://localhost:11434".into(),
            lmstudio_url: "http://localhost:1234".into(),
        }
    }
}

/// VS Code language-model selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsCodeLmSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

/// The persisted provider settings record.
///
/// One record holds the fields of every provider; only the fields of the
/// active provider matter, the rest are kept so switching back restores
/// them. Field names follow the persisted camelCase shape, and absent fields
/// are omitted when saving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_provider: Option<ProviderName>,
    /// Model id of the static-catalog providers, mirrored from the selection
    /// for every provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_model_id: Option<String>,

    // Anthropic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_base_url: Option<String>,

    // Router providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_router_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_router_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_router_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glama_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glama_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unbound_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unbound_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requesty_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requesty_model_id: Option<String>,

    // AWS Bedrock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_use_cross_region_inference: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_use_prompt_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_use_profile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_custom_arn: Option<String>,

    // GCP Vertex
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_key_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_json_credentials: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_region: Option<String>,

    // OpenAI-compatible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_custom_model_info: Option<CustomModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_headers: Option<HeaderMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_use_azure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub azure_api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_streaming_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_host_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_r1_format_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_legacy_format: Option<bool>,

    // Local backends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_studio_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_studio_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_studio_draft_model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lm_studio_speculative_decoding_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs_code_lm_model_selector: Option<VsCodeLmSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub litellm_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub litellm_api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub litellm_model_id: Option<String>,

    // Managed APIs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_gemini_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_ai_native_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mistral_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mistral_codestral_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_seek_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_seek_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chutes_api_key: Option<String>,

    // Shared across providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_max_thinking_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_caching_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuzzy_match_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_seconds: Option<u32>,
}

impl ProviderSettings {
    /// The active provider; an unset identity means Anthropic.
    #[must_use]
    pub fn provider(&self) -> ProviderName {
        self.api_provider.unwrap_or_default()
    }

    /// The canonical custom header mapping, empty when unset.
    #[must_use]
    pub fn headers(&self) -> HeaderMap {
        self.open_ai_headers.clone().unwrap_or_default()
    }
}

/// Returns the trimmed value when it is present and non-empty.
///
/// Settings fields are "unset" when absent, empty, or whitespace only.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
