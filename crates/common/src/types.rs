//! Data types shared by the settings schema, the provider tables, and the
//! reconciliation engine.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Backend LLM service family.
///
/// Persisted settings spell these in kebab-case (`"openai-native"`,
/// `"vscode-lm"`, ...). A settings record without a provider means
/// [`ProviderName::Anthropic`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderName {
    #[default]
    Anthropic,
    #[serde(rename = "openrouter")]
    OpenRouter,
    Bedrock,
    Vertex,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
    #[serde(rename = "lmstudio")]
    LmStudio,
    Gemini,
    #[serde(rename = "openai-native")]
    OpenAiNative,
    Mistral,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "vscode-lm")]
    VsCodeLm,
    Unbound,
    Requesty,
    HumanRelay,
    Glama,
    #[serde(rename = "xai")]
    XAi,
    Groq,
    Chutes,
    #[serde(rename = "litellm")]
    LiteLlm,
}

impl ProviderName {
    pub const ALL: [Self; 20] = [
        Self::Anthropic,
        Self::OpenRouter,
        Self::Bedrock,
        Self::Vertex,
        Self::OpenAi,
        Self::Ollama,
        Self::LmStudio,
        Self::Gemini,
        Self::OpenAiNative,
        Self::Mistral,
        Self::DeepSeek,
        Self::VsCodeLm,
        Self::Unbound,
        Self::Requesty,
        Self::HumanRelay,
        Self::Glama,
        Self::XAi,
        Self::Groq,
        Self::Chutes,
        Self::LiteLlm,
    ];

    /// The persisted identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenRouter => "openrouter",
            Self::Bedrock => "bedrock",
            Self::Vertex => "vertex",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::LmStudio => "lmstudio",
            Self::Gemini => "gemini",
            Self::OpenAiNative => "openai-native",
            Self::Mistral => "mistral",
            Self::DeepSeek => "deepseek",
            Self::VsCodeLm => "vscode-lm",
            Self::Unbound => "unbound",
            Self::Requesty => "requesty",
            Self::HumanRelay => "human-relay",
            Self::Glama => "glama",
            Self::XAi => "xai",
            Self::Groq => "groq",
            Self::Chutes => "chutes",
            Self::LiteLlm => "litellm",
        }
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownProvider(needle.to_string()))
    }
}

/// Capabilities and pricing of one model. Prices are per million tokens.
///
/// Catalog entries are never mutated; user overrides live in
/// [`CustomModelInfo`] and are resolved on top of a base record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// `None` means the backend decides (no explicit output cap).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub context_window: u32,
    #[serde(default)]
    pub supports_images: bool,
    #[serde(default)]
    pub supports_computer_use: bool,
    pub supports_prompt_cache: bool,
    /// Prompt caching can be switched off by the user.
    #[serde(default)]
    pub is_prompt_cache_optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_reads_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_writes_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ModelInfo {
    /// A record with the given context window and every optional capability off.
    #[must_use]
    pub fn with_context_window(context_window: u32) -> Self {
        Self {
            max_tokens: None,
            context_window,
            supports_images: false,
            supports_computer_use: false,
            supports_prompt_cache: false,
            is_prompt_cache_optional: false,
            input_price: None,
            output_price: None,
            cache_reads_price: None,
            cache_writes_price: None,
            description: None,
        }
    }

    /// Whether the user gets a prompt-caching toggle for this model.
    #[must_use]
    pub fn prompt_cache_is_toggleable(&self) -> bool {
        self.supports_prompt_cache && self.is_prompt_cache_optional
    }
}

/// User-supplied override of a free-form model's capabilities.
///
/// Every field is optional; unset fields inherit from the base record on
/// [`CustomModelInfo::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_computer_use: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_prompt_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_reads_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_writes_price: Option<f64>,
}

impl CustomModelInfo {
    /// Seed an override from a full record, as the editing form does before
    /// the first change.
    #[must_use]
    pub fn from_info(info: &ModelInfo) -> Self {
        Self {
            max_tokens: info.max_tokens,
            context_window: Some(info.context_window),
            supports_images: Some(info.supports_images),
            supports_computer_use: None,
            supports_prompt_cache: Some(info.supports_prompt_cache),
            input_price: info.input_price,
            output_price: info.output_price,
            cache_reads_price: info.cache_reads_price,
            cache_writes_price: info.cache_writes_price,
        }
    }

    /// Merge this override on top of `base`.
    ///
    /// Computer use is the one capability that does not inherit: it stays
    /// off unless the override turns it on.
    #[must_use]
    pub fn resolve(&self, base: &ModelInfo) -> ModelInfo {
        ModelInfo {
            max_tokens: self.max_tokens.or(base.max_tokens),
            context_window: self.context_window.unwrap_or(base.context_window),
            supports_images: self.supports_images.unwrap_or(base.supports_images),
            supports_computer_use: self.supports_computer_use.unwrap_or(false),
            supports_prompt_cache: self
                .supports_prompt_cache
                .unwrap_or(base.supports_prompt_cache),
            is_prompt_cache_optional: base.is_prompt_cache_optional,
            input_price: self.input_price.or(base.input_price),
            output_price: self.output_price.or(base.output_price),
            cache_reads_price: self.cache_reads_price.or(base.cache_reads_price),
            cache_writes_price: self.cache_writes_price.or(base.cache_writes_price),
            description: base.description.clone(),
        }
    }
}

/// Model id to capabilities, ordered by id.
pub type ModelCatalog = BTreeMap<String, ModelInfo>;

/// Fetched catalogs of every provider loaded so far.
pub type CatalogSnapshot = BTreeMap<ProviderName, ModelCatalog>;
