//! Catalog fetching over HTTP.
//!
//! Router APIs report prices per token; catalogs store them per million
//! tokens. Free-form backends (OpenAI-compatible, Ollama, LM Studio) only
//! report ids, so their entries carry the OpenAI-compatible defaults.

use std::{collections::BTreeMap, time::Duration};

use {
    apiconf_common::{ModelCatalog, ModelInfo, ProviderName},
    apiconf_config::{CatalogConfig, HeaderMap, ProviderSettings, non_empty},
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::{
    error::{Context, Error, Result},
    models::openai_compatible_defaults,
    registry::descriptor,
};

const PER_MILLION: f64 = 1_000_000.0;

// ── Connection parameters ───────────────────────────────────────────────────

/// What a catalog request needs to reach a provider.
#[derive(Debug, Clone, Default)]
pub struct ConnectionParams {
    /// Overrides the configured endpoint when set.
    pub base_url: Option<String>,
    pub api_key: Option<Secret<String>>,
    pub headers: HeaderMap,
}

impl PartialEq for ConnectionParams {
    fn eq(&self, other: &Self) -> bool {
        let keys_match = match (&self.api_key, &other.api_key) {
            (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
            (None, None) => true,
            _ => false,
        };
        keys_match && self.base_url == other.base_url && self.headers == other.headers
    }
}

impl Eq for ConnectionParams {}

fn secret(value: Option<&str>) -> Option<Secret<String>> {
    non_empty(value).map(|v| Secret::new(v.to_string()))
}

fn url(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

/// Connection parameters of `provider` as currently configured.
///
/// `None` for providers whose catalog is never fetched. `headers` is the
/// custom header mapping to send, used by the OpenAI-compatible provider.
#[must_use]
pub fn connection_params(
    provider: ProviderName,
    settings: &ProviderSettings,
    headers: &HeaderMap,
) -> Option<ConnectionParams> {
    use ProviderName as P;

    if !descriptor(provider).catalog.is_fetched() {
        return None;
    }

    let params = match provider {
        P::OpenRouter => ConnectionParams {
            base_url: url(settings.open_router_base_url.as_deref()),
            api_key: secret(settings.open_router_api_key.as_deref()),
            ..Default::default()
        },
        P::Requesty => ConnectionParams {
            api_key: secret(settings.requesty_api_key.as_deref()),
            ..Default::default()
        },
        P::Unbound => ConnectionParams {
            api_key: secret(settings.unbound_api_key.as_deref()),
            ..Default::default()
        },
        P::OpenAi => ConnectionParams {
            base_url: url(settings.open_ai_base_url.as_deref()),
            api_key: secret(settings.open_ai_api_key.as_deref()),
            headers: headers.clone(),
        },
        P::Ollama => ConnectionParams {
            base_url: url(settings.ollama_base_url.as_deref()),
            ..Default::default()
        },
        P::LmStudio => ConnectionParams {
            base_url: url(settings.lm_studio_base_url.as_deref()),
            ..Default::default()
        },
        P::LiteLlm => ConnectionParams {
            base_url: url(settings.litellm_api_url.as_deref()),
            api_key: secret(settings.litellm_api_key.as_deref()),
            ..Default::default()
        },
        _ => ConnectionParams::default(),
    };
    Some(params)
}

// ── Fetcher ─────────────────────────────────────────────────────────────────

/// Lists the models a provider currently offers.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_catalog(
        &self,
        provider: ProviderName,
        params: &ConnectionParams,
    ) -> Result<ModelCatalog>;
}

/// [`CatalogFetcher`] backed by each provider's HTTP listing endpoint.
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl HttpCatalogFetcher {
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let timeout = Duration::from_secs(config.request_timeout_secs.max(1));
        let client = match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "failed to build catalog client, using shared client");
                crate::shared_http_client().clone()
            },
        };
        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self, provider: ProviderName, params: &ConnectionParams) -> Result<String> {
        use ProviderName as P;

        let (configured, path) = match provider {
            P::OpenRouter => (Some(&self.config.openrouter_url), "/models"),
            P::Requesty => (Some(&self.config.requesty_url), "/models"),
            P::Glama => (Some(&self.config.glama_url), "/models"),
            P::Unbound => (Some(&self.config.unbound_url), "/models"),
            P::LiteLlm => (Some(&self.config.litellm_url), "/v1/model/info"),
            P::Ollama => (Some(&self.config.ollama_url), "/api/tags"),
            P::LmStudio => (Some(&self.config.lmstudio_url), "/v1/models"),
            P::OpenAi => (None, "/models"),
            _ => return Err(Error::Unsupported(provider)),
        };
        let base = params
            .base_url
            .as_deref()
            .or(configured.map(String::as_str))
            .with_context(|| format!("{provider} requires a base URL to list models"))?;
        Ok(format!("{}{path}", base.trim().trim_end_matches('/')))
    }

    async fn get_json(&self, url: &str, params: &ConnectionParams) -> Result<Value> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(key) = &params.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        for (name, value) in &params.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_catalog(
        &self,
        provider: ProviderName,
        params: &ConnectionParams,
    ) -> Result<ModelCatalog> {
        use ProviderName as P;

        let url = self.endpoint(provider, params)?;
        debug!(%provider, %url, "fetching model catalog");
        let body = self.get_json(&url, params).await?;

        let catalog = match provider {
            P::OpenRouter => parse_openrouter(body)?,
            P::Requesty => parse_requesty(body)?,
            P::Glama => parse_glama(body)?,
            P::Unbound => parse_unbound(body)?,
            P::LiteLlm => parse_litellm(body)?,
            P::Ollama => parse_ollama(body)?,
            P::OpenAi | P::LmStudio => parse_model_ids(body)?,
            _ => return Err(Error::Unsupported(provider)),
        };
        debug!(%provider, models = catalog.len(), "model catalog fetched");
        Ok(catalog)
    }
}

// ── Response parsers ────────────────────────────────────────────────────────

fn per_million(price: Option<&PriceValue>) -> Option<f64> {
    price.and_then(PriceValue::as_f64).map(|p| p * PER_MILLION)
}

/// Prices arrive as numbers or as decimal strings depending on the API.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterModel {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    context_length: Option<u32>,
    #[serde(default)]
    architecture: Option<OpenRouterArchitecture>,
    #[serde(default)]
    top_provider: Option<OpenRouterTopProvider>,
    #[serde(default)]
    pricing: Option<OpenRouterPricing>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterArchitecture {
    #[serde(default)]
    modality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterTopProvider {
    #[serde(default)]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterPricing {
    #[serde(default)]
    prompt: Option<PriceValue>,
    #[serde(default)]
    completion: Option<PriceValue>,
    #[serde(default)]
    input_cache_read: Option<PriceValue>,
    #[serde(default)]
    input_cache_write: Option<PriceValue>,
}

/// OpenRouter only exposes computer use through Claude Sonnet models.
fn openrouter_computer_use(id: &str) -> bool {
    id.starts_with("anthropic/claude-3.7-sonnet") || id.starts_with("anthropic/claude-3.5-sonnet")
}

fn parse_openrouter(body: Value) -> Result<ModelCatalog> {
    let envelope: DataEnvelope<OpenRouterModel> = serde_json::from_value(body)?;
    Ok(envelope
        .data
        .into_iter()
        .map(|m| {
            let pricing = m.pricing.as_ref();
            let cache_reads = per_million(pricing.and_then(|p| p.input_cache_read.as_ref()));
            let cache_writes = per_million(pricing.and_then(|p| p.input_cache_write.as_ref()));
            let info = ModelInfo {
                max_tokens: m.top_provider.and_then(|t| t.max_completion_tokens),
                supports_images: m
                    .architecture
                    .and_then(|a| a.modality)
                    .is_some_and(|modality| modality.contains("image")),
                supports_computer_use: openrouter_computer_use(&m.id),
                supports_prompt_cache: cache_reads.is_some() || cache_writes.is_some(),
                input_price: per_million(pricing.and_then(|p| p.prompt.as_ref())),
                output_price: per_million(pricing.and_then(|p| p.completion.as_ref())),
                cache_reads_price: cache_reads,
                cache_writes_price: cache_writes,
                description: m.description,
                ..ModelInfo::with_context_window(m.context_length.unwrap_or(0))
            };
            (m.id, info)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RequestyModel {
    id: String,
    #[serde(default)]
    max_output_tokens: Option<u32>,
    #[serde(default)]
    context_window: Option<u32>,
    #[serde(default)]
    supports_caching: bool,
    #[serde(default)]
    supports_vision: bool,
    #[serde(default)]
    supports_computer_use: bool,
    #[serde(default)]
    input_price: Option<PriceValue>,
    #[serde(default)]
    output_price: Option<PriceValue>,
    #[serde(default)]
    caching_price: Option<PriceValue>,
    #[serde(default)]
    cached_price: Option<PriceValue>,
    #[serde(default)]
    description: Option<String>,
}

fn parse_requesty(body: Value) -> Result<ModelCatalog> {
    let envelope: DataEnvelope<RequestyModel> = serde_json::from_value(body)?;
    Ok(envelope
        .data
        .into_iter()
        .map(|m| {
            let info = ModelInfo {
                max_tokens: m.max_output_tokens,
                supports_images: m.supports_vision,
                supports_computer_use: m.supports_computer_use,
                supports_prompt_cache: m.supports_caching,
                input_price: per_million(m.input_price.as_ref()),
                output_price: per_million(m.output_price.as_ref()),
                cache_writes_price: per_million(m.caching_price.as_ref()),
                cache_reads_price: per_million(m.cached_price.as_ref()),
                description: m.description,
                ..ModelInfo::with_context_window(m.context_window.unwrap_or(0))
            };
            (m.id, info)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlamaModel {
    id: String,
    #[serde(default)]
    max_tokens_output: Option<u32>,
    #[serde(default)]
    max_tokens_input: Option<u32>,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    price_per_token: Option<GlamaPricing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlamaPricing {
    #[serde(default)]
    input: Option<PriceValue>,
    #[serde(default)]
    output: Option<PriceValue>,
    #[serde(default)]
    cache_read: Option<PriceValue>,
    #[serde(default)]
    cache_write: Option<PriceValue>,
}

fn parse_glama(body: Value) -> Result<ModelCatalog> {
    let models: Vec<GlamaModel> = serde_json::from_value(body)?;
    Ok(models
        .into_iter()
        .map(|m| {
            let has = |cap: &str| m.capabilities.iter().any(|c| c == cap);
            let pricing = m.price_per_token.as_ref();
            let info = ModelInfo {
                max_tokens: m.max_tokens_output,
                supports_images: has("input:image"),
                supports_computer_use: has("computer_use"),
                supports_prompt_cache: has("caching"),
                input_price: per_million(pricing.and_then(|p| p.input.as_ref())),
                output_price: per_million(pricing.and_then(|p| p.output.as_ref())),
                cache_reads_price: per_million(pricing.and_then(|p| p.cache_read.as_ref())),
                cache_writes_price: per_million(pricing.and_then(|p| p.cache_write.as_ref())),
                ..ModelInfo::with_context_window(m.max_tokens_input.unwrap_or(0))
            };
            (m.id, info)
        })
        .collect())
}

/// Unbound keys its listing by model id and already prices per million.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnboundModel {
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    context_window: Option<u32>,
    #[serde(default)]
    supports_images: bool,
    #[serde(default)]
    supports_prompt_caching: bool,
    #[serde(default)]
    supports_computer_use: bool,
    #[serde(default)]
    input_token_price: Option<PriceValue>,
    #[serde(default)]
    output_token_price: Option<PriceValue>,
    #[serde(default)]
    cache_read_price: Option<PriceValue>,
    #[serde(default)]
    cache_write_price: Option<PriceValue>,
}

fn parse_unbound(body: Value) -> Result<ModelCatalog> {
    let models: BTreeMap<String, UnboundModel> = serde_json::from_value(body)?;
    Ok(models
        .into_iter()
        .map(|(id, m)| {
            let info = ModelInfo {
                max_tokens: m.max_tokens,
                supports_images: m.supports_images,
                supports_computer_use: m.supports_computer_use,
                supports_prompt_cache: m.supports_prompt_caching,
                input_price: m.input_token_price.as_ref().and_then(PriceValue::as_f64),
                output_price: m.output_token_price.as_ref().and_then(PriceValue::as_f64),
                cache_reads_price: m.cache_read_price.as_ref().and_then(PriceValue::as_f64),
                cache_writes_price: m.cache_write_price.as_ref().and_then(PriceValue::as_f64),
                ..ModelInfo::with_context_window(m.context_window.unwrap_or(0))
            };
            (id, info)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct LiteLlmModel {
    model_name: String,
    #[serde(default)]
    model_info: LiteLlmModelInfo,
}

#[derive(Debug, Default, Deserialize)]
struct LiteLlmModelInfo {
    #[serde(default)]
    max_tokens: Option<u32>,
    #[serde(default)]
    max_input_tokens: Option<u32>,
    #[serde(default)]
    supports_vision: Option<bool>,
    #[serde(default)]
    supports_prompt_caching: Option<bool>,
    #[serde(default)]
    supports_computer_use: Option<bool>,
    #[serde(default)]
    input_cost_per_token: Option<PriceValue>,
    #[serde(default)]
    output_cost_per_token: Option<PriceValue>,
}

fn parse_litellm(body: Value) -> Result<ModelCatalog> {
    let envelope: DataEnvelope<LiteLlmModel> = serde_json::from_value(body)?;
    Ok(envelope
        .data
        .into_iter()
        .map(|m| {
            let i = m.model_info;
            let info = ModelInfo {
                max_tokens: i.max_tokens,
                supports_images: i.supports_vision.unwrap_or(false),
                supports_computer_use: i.supports_computer_use.unwrap_or(false),
                supports_prompt_cache: i.supports_prompt_caching.unwrap_or(false),
                input_price: per_million(i.input_cost_per_token.as_ref()),
                output_price: per_million(i.output_cost_per_token.as_ref()),
                ..ModelInfo::with_context_window(i.max_input_tokens.unwrap_or(0))
            };
            (m.model_name, info)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct OllamaTagsPayload {
    #[serde(default)]
    models: Vec<OllamaTagEntry>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagEntry {
    name: String,
}

fn parse_ollama(body: Value) -> Result<ModelCatalog> {
    let payload: OllamaTagsPayload = serde_json::from_value(body)?;
    Ok(id_catalog(payload.models.into_iter().map(|m| m.name)))
}

#[derive(Debug, Deserialize)]
struct ModelIdEntry {
    id: String,
}

fn parse_model_ids(body: Value) -> Result<ModelCatalog> {
    let envelope: DataEnvelope<ModelIdEntry> = serde_json::from_value(body)?;
    Ok(id_catalog(envelope.data.into_iter().map(|m| m.id)))
}

fn id_catalog(ids: impl Iterator<Item = String>) -> ModelCatalog {
    let defaults = openai_compatible_defaults();
    ids.map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .map(|id| (id, defaults.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde_json::json};

    fn fetcher_for(url: &str) -> HttpCatalogFetcher {
        HttpCatalogFetcher::new(&CatalogConfig {
            openrouter_url: url.to_string(),
            requesty_url: url.to_string(),
            glama_url: url.to_string(),
            unbound_url: url.to_string(),
            litellm_url: url.to_string(),
            ollama_url: url.to_string(),
            lmstudio_url: url.to_string(),
            request_timeout_secs: 5,
        })
    }

    #[test]
    fn openrouter_prices_are_per_million() {
        let catalog = parse_openrouter(json!({
            "data": [{
                "id": "anthropic/claude-3.7-sonnet",
                "context_length": 200000,
                "architecture": { "modality": "text+image->text" },
                "top_provider": { "max_completion_tokens": 8192 },
                "pricing": {
                    "prompt": "0.000003",
                    "completion": "0.000015",
                    "input_cache_read": "0.0000003",
                }
            }, {
                "id": "meta-llama/llama-3-8b",
                "context_length": 8192,
                "architecture": { "modality": "text->text" },
            }]
        }))
        .unwrap();

        let sonnet = &catalog["anthropic/claude-3.7-sonnet"];
        assert_eq!(sonnet.context_window, 200_000);
        assert_eq!(sonnet.max_tokens, Some(8_192));
        assert!(sonnet.supports_images);
        assert!(sonnet.supports_computer_use);
        assert!(sonnet.supports_prompt_cache);
        assert!((sonnet.input_price.unwrap() - 3.0).abs() < 1e-9);
        assert!((sonnet.output_price.unwrap() - 15.0).abs() < 1e-9);

        let llama = &catalog["meta-llama/llama-3-8b"];
        assert!(!llama.supports_images);
        assert!(!llama.supports_prompt_cache);
        assert_eq!(llama.input_price, None);
    }

    #[test]
    fn glama_capabilities_map_to_flags() {
        let catalog = parse_glama(json!([{
            "id": "anthropic/claude-3-7-sonnet",
            "maxTokensOutput": 8192,
            "maxTokensInput": 200000,
            "capabilities": ["input:image", "computer_use", "caching"],
            "pricePerToken": { "input": "0.000003", "output": 0.000015 }
        }]))
        .unwrap();
        let info = &catalog["anthropic/claude-3-7-sonnet"];
        assert!(info.supports_images && info.supports_computer_use && info.supports_prompt_cache);
        assert!((info.output_price.unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn unbound_listing_is_keyed_by_id() {
        let catalog = parse_unbound(json!({
            "anthropic/claude-3-7-sonnet-20250219": {
                "contextWindow": 200000,
                "maxTokens": 8192,
                "supportsImages": true,
                "inputTokenPrice": "3.00",
            }
        }))
        .unwrap();
        let info = &catalog["anthropic/claude-3-7-sonnet-20250219"];
        assert_eq!(info.input_price, Some(3.0));
        assert!(info.supports_images);
    }

    #[test]
    fn litellm_and_local_listings() {
        let catalog = parse_litellm(json!({
            "data": [{ "model_name": "gpt-4o", "model_info": { "max_input_tokens": 128000, "supports_vision": true } }]
        }))
        .unwrap();
        assert_eq!(catalog["gpt-4o"].context_window, 128_000);

        let ollama = parse_ollama(json!({ "models": [{ "name": "llama3.2:latest" }, { "name": " " }] }))
            .unwrap();
        assert_eq!(ollama.keys().collect::<Vec<_>>(), vec!["llama3.2:latest"]);
        assert_eq!(ollama["llama3.2:latest"].context_window, 128_000);
    }

    #[test]
    fn connection_params_follow_the_provider() {
        let settings = ProviderSettings {
            open_ai_base_url: Some("https://api.example.com/v1".into()),
            open_ai_api_key: Some("sk-1".into()),
            ollama_base_url: Some(" ".into()),
            ..Default::default()
        };
        let headers = HeaderMap::from([("X-Org".to_string(), "1".to_string())]);

        let openai = connection_params(ProviderName::OpenAi, &settings, &headers).unwrap();
        assert_eq!(openai.base_url.as_deref(), Some("https://api.example.com/v1"));
        assert_eq!(openai.headers, headers);

        let ollama = connection_params(ProviderName::Ollama, &settings, &headers).unwrap();
        assert_eq!(ollama, ConnectionParams::default());

        assert!(connection_params(ProviderName::Anthropic, &settings, &headers).is_none());
        assert!(connection_params(ProviderName::HumanRelay, &settings, &headers).is_none());
    }

    #[test]
    fn params_compare_secrets_by_value() {
        let a = ConnectionParams {
            api_key: secret(Some("k1")),
            ..Default::default()
        };
        let b = ConnectionParams {
            api_key: secret(Some("k1")),
            ..Default::default()
        };
        let c = ConnectionParams {
            api_key: secret(Some("k2")),
            ..Default::default()
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, ConnectionParams::default());
    }

    // ── HTTP integration tests (with mockito) ──────────────────────────

    #[tokio::test]
    async fn fetches_openai_models_with_auth_and_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/models")
            .match_header("authorization", "Bearer sk-test")
            .match_header("x-org", "acme")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "data": [{ "id": "gpt-4o" }, { "id": "o1" }] }).to_string())
            .create_async()
            .await;

        let params = ConnectionParams {
            base_url: Some(format!("{}/v1/", server.url())),
            api_key: secret(Some("sk-test")),
            headers: HeaderMap::from([("x-org".to_string(), "acme".to_string())]),
        };
        let catalog = fetcher_for(&server.url())
            .fetch_catalog(ProviderName::OpenAi, &params)
            .await
            .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains_key("o1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn falls_back_to_configured_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(json!({ "models": [{ "name": "qwen2.5:7b" }] }).to_string())
            .create_async()
            .await;

        let catalog = fetcher_for(&server.url())
            .fetch_catalog(ProviderName::Ollama, &ConnectionParams::default())
            .await
            .unwrap();
        assert!(catalog.contains_key("qwen2.5:7b"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_errors_surface_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let err = fetcher_for(&server.url())
            .fetch_catalog(ProviderName::Requesty, &ConnectionParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 401, .. }));
        assert!(err.to_string().contains("unauthorized"));
    }

    #[tokio::test]
    async fn unsupported_and_unconfigured_providers_fail_fast() {
        let fetcher = fetcher_for("http://127.0.0.1:9");
        let err = fetcher
            .fetch_catalog(ProviderName::VsCodeLm, &ConnectionParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(ProviderName::VsCodeLm)));

        let err = fetcher
            .fetch_catalog(ProviderName::OpenAi, &ConnectionParams::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("base URL"));
    }
}
