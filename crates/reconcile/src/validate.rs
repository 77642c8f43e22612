//! Settings validation.
//!
//! Two checks run in order and the first failure wins: general validity
//! (required fields, URL shape), then model availability. Failures carry an
//! opaque message key plus parameters; rendering is left to a [`Translate`]
//! implementation supplied by the caller.

use std::{collections::BTreeMap, sync::LazyLock};

use {
    apiconf_common::{CatalogSnapshot, ProviderName},
    apiconf_config::{ProviderSettings, non_empty, validate::check_http_url},
    apiconf_providers::{CatalogKind, ModelField, descriptor, static_catalog},
    regex::Regex,
    thiserror::Error,
};

use crate::selection::{is_custom_locator, select};

/// Renders a message key with parameters into user-facing text.
pub trait Translate {
    fn translate(&self, key: &str, params: &BTreeMap<&'static str, String>) -> String;
}

/// Coarse classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigurationInvalid,
    ModelNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{provider}: {field} is required")]
    MissingField {
        provider: ProviderName,
        /// Persisted settings key.
        field: &'static str,
    },

    #[error("{provider}: {field} is not a valid http(s) URL: {value}")]
    MalformedUrl {
        provider: ProviderName,
        field: &'static str,
        value: String,
    },

    #[error("invalid Bedrock ARN: {arn}")]
    MalformedArn { arn: String },

    #[error("{provider}: model {model_id} is not available")]
    ModelNotFound {
        provider: ProviderName,
        model_id: String,
    },
}

/// `None` means valid.
pub type ValidationResult = Option<ValidationError>;

impl ValidationError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ModelNotFound { .. } => ErrorKind::ModelNotFound,
            _ => ErrorKind::ConfigurationInvalid,
        }
    }

    #[must_use]
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::MissingField { field, .. } => match *field {
                "awsRegion" => "settings:validation.awsRegion",
                "awsCustomArn" => "settings:validation.customArn",
                "vertexProjectId" | "vertexRegion" => "settings:validation.googleCloud",
                "openAiBaseUrl" | "openAiApiKey" | "openAiModelId" => "settings:validation.openAi",
                "ollamaModelId" | "lmStudioModelId" => "settings:validation.modelId",
                "vsCodeLmModelSelector" => "settings:validation.modelSelector",
                _ => "settings:validation.apiKey",
            },
            Self::MalformedUrl { .. } => "settings:validation.baseUrl",
            Self::MalformedArn { .. } => "settings:validation.invalidArnFormat",
            Self::ModelNotFound { .. } => "settings:validation.modelAvailability",
        }
    }

    #[must_use]
    pub fn params(&self) -> BTreeMap<&'static str, String> {
        match self {
            Self::MissingField { provider, field } => BTreeMap::from([
                ("provider", provider.to_string()),
                ("field", (*field).to_string()),
            ]),
            Self::MalformedUrl {
                provider,
                field,
                value,
            } => BTreeMap::from([
                ("provider", provider.to_string()),
                ("field", (*field).to_string()),
                ("value", value.clone()),
            ]),
            Self::MalformedArn { arn } => BTreeMap::from([("arn", arn.clone())]),
            Self::ModelNotFound { provider, model_id } => BTreeMap::from([
                ("provider", provider.to_string()),
                ("modelId", model_id.clone()),
            ]),
        }
    }

    /// The user-facing message.
    #[must_use]
    pub fn render(&self, translator: &dyn Translate) -> String {
        translator.translate(self.message_key(), &self.params())
    }
}

/// Run both checks; the first failure wins.
#[must_use]
pub fn validate(settings: &ProviderSettings, catalogs: &CatalogSnapshot) -> ValidationResult {
    validate_configuration(settings).or_else(|| validate_model_id(settings, catalogs))
}

// ── General validity ────────────────────────────────────────────────────────

static BEDROCK_ARN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^arn:aws:bedrock:([^:]+):([^:]*):(?:([^/]+)/([\w.\-:]+)|([^/]+))$").ok()
});

/// Whether `arn` has the shape of a Bedrock model or inference-profile ARN.
#[must_use]
pub fn is_bedrock_arn(arn: &str) -> bool {
    BEDROCK_ARN
        .as_ref()
        .is_some_and(|re| re.is_match(arn.trim()))
}

/// Required fields and URL shape for the active provider.
#[must_use]
pub fn validate_configuration(settings: &ProviderSettings) -> ValidationResult {
    let provider = settings.provider();
    let missing = |value: Option<&str>, field: &'static str| {
        non_empty(value)
            .is_none()
            .then_some(ValidationError::MissingField { provider, field })
    };

    use ProviderName as P;
    let required = match provider {
        P::Anthropic => missing(settings.api_key.as_deref(), "apiKey"),
        P::OpenRouter => missing(settings.open_router_api_key.as_deref(), "openRouterApiKey"),
        P::Glama => missing(settings.glama_api_key.as_deref(), "glamaApiKey"),
        P::Unbound => missing(settings.unbound_api_key.as_deref(), "unboundApiKey"),
        P::Requesty => missing(settings.requesty_api_key.as_deref(), "requestyApiKey"),
        P::Gemini => missing(settings.gemini_api_key.as_deref(), "geminiApiKey"),
        P::OpenAiNative => missing(settings.open_ai_native_api_key.as_deref(), "openAiNativeApiKey"),
        P::Mistral => missing(settings.mistral_api_key.as_deref(), "mistralApiKey"),
        P::DeepSeek => missing(settings.deep_seek_api_key.as_deref(), "deepSeekApiKey"),
        P::XAi => missing(settings.xai_api_key.as_deref(), "xaiApiKey"),
        P::Groq => missing(settings.groq_api_key.as_deref(), "groqApiKey"),
        P::Chutes => missing(settings.chutes_api_key.as_deref(), "chutesApiKey"),
        P::Bedrock => missing(settings.aws_region.as_deref(), "awsRegion")
            .or_else(|| validate_custom_arn(settings)),
        P::Vertex => missing(settings.vertex_project_id.as_deref(), "vertexProjectId")
            .or_else(|| missing(settings.vertex_region.as_deref(), "vertexRegion")),
        P::OpenAi => missing(settings.open_ai_base_url.as_deref(), "openAiBaseUrl")
            .or_else(|| missing(settings.open_ai_api_key.as_deref(), "openAiApiKey"))
            .or_else(|| missing(settings.open_ai_model_id.as_deref(), "openAiModelId")),
        P::Ollama => missing(settings.ollama_model_id.as_deref(), "ollamaModelId"),
        P::LmStudio => missing(settings.lm_studio_model_id.as_deref(), "lmStudioModelId"),
        P::VsCodeLm => ModelField::VsCodeLmSelector
            .get(settings)
            .is_none()
            .then_some(ValidationError::MissingField {
                provider,
                field: "vsCodeLmModelSelector",
            }),
        P::LiteLlm | P::HumanRelay => None,
    };

    required.or_else(|| validate_base_urls(provider, settings))
}

fn validate_custom_arn(settings: &ProviderSettings) -> ValidationResult {
    let model_id = ModelField::ApiModelId.get(settings).unwrap_or_default();
    if !is_custom_locator(ProviderName::Bedrock, &model_id) {
        return None;
    }
    match non_empty(settings.aws_custom_arn.as_deref()) {
        None => Some(ValidationError::MissingField {
            provider: ProviderName::Bedrock,
            field: "awsCustomArn",
        }),
        Some(arn) if !is_bedrock_arn(arn) => Some(ValidationError::MalformedArn {
            arn: arn.to_string(),
        }),
        Some(_) => None,
    }
}

fn validate_base_urls(provider: ProviderName, settings: &ProviderSettings) -> ValidationResult {
    use ProviderName as P;
    let fields: &[(&'static str, Option<&str>)] = match provider {
        P::Anthropic => &[("anthropicBaseUrl", settings.anthropic_base_url.as_deref())],
        P::OpenRouter => &[("openRouterBaseUrl", settings.open_router_base_url.as_deref())],
        P::OpenAi => &[("openAiBaseUrl", settings.open_ai_base_url.as_deref())],
        P::Ollama => &[("ollamaBaseUrl", settings.ollama_base_url.as_deref())],
        P::LmStudio => &[("lmStudioBaseUrl", settings.lm_studio_base_url.as_deref())],
        P::LiteLlm => &[("litellmApiUrl", settings.litellm_api_url.as_deref())],
        P::Gemini => &[("googleGeminiBaseUrl", settings.google_gemini_base_url.as_deref())],
        P::DeepSeek => &[("deepSeekBaseUrl", settings.deep_seek_base_url.as_deref())],
        P::Mistral => &[("mistralCodestralUrl", settings.mistral_codestral_url.as_deref())],
        _ => &[],
    };

    fields.iter().find_map(|&(field, value)| {
        let value = non_empty(value)?;
        check_http_url(value)
            .is_err()
            .then(|| ValidationError::MalformedUrl {
                provider,
                field,
                value: value.to_string(),
            })
    })
}

// ── Model availability ──────────────────────────────────────────────────────

/// The selected model must exist in the provider's catalog.
///
/// Static providers check their compiled-in table. Router providers check
/// the fetched catalog once one has loaded. Free-form providers accept any
/// id.
#[must_use]
pub fn validate_model_id(
    settings: &ProviderSettings,
    catalogs: &CatalogSnapshot,
) -> ValidationResult {
    let selection = select(settings, catalogs);
    let provider = selection.provider;
    if is_custom_locator(provider, &selection.model_id) {
        return None;
    }

    let known = match descriptor(provider).catalog {
        CatalogKind::Static => static_catalog(provider).contains_key(&selection.model_id),
        CatalogKind::Router => match catalogs.get(&provider) {
            Some(catalog) if !catalog.is_empty() => catalog.contains_key(&selection.model_id),
            _ => true,
        },
        CatalogKind::Dynamic | CatalogKind::None => true,
    };

    (!known).then(|| ValidationError::ModelNotFound {
        provider,
        model_id: selection.model_id,
    })
}
