//! Compiled-in model catalogs and fallback capability records.

use std::{collections::HashMap, sync::LazyLock};

use apiconf_common::{ModelCatalog, ModelInfo, ProviderName};

/// Model id that stands for "a custom Bedrock resource ARN is configured".
pub const CUSTOM_ARN_MODEL_ID: &str = "custom-arn";

pub const LITELLM_DEFAULT_MODEL_ID: &str = "gpt-3.5-turbo";

#[derive(Clone, Copy)]
enum Cache {
    No,
    Always,
    Optional,
}

#[derive(Clone, Copy)]
struct ModelCatalogEntry {
    id: &'static str,
    max_tokens: u32,
    context_window: u32,
    images: bool,
    computer_use: bool,
    cache: Cache,
    input: f64,
    output: f64,
    cache_writes: Option<f64>,
    cache_reads: Option<f64>,
}

const BASE: ModelCatalogEntry = ModelCatalogEntry {
    id: "",
    max_tokens: 8_192,
    context_window: 128_000,
    images: false,
    computer_use: false,
    cache: Cache::No,
    input: 0.0,
    output: 0.0,
    cache_writes: None,
    cache_reads: None,
};

const CLAUDE_37: ModelCatalogEntry = ModelCatalogEntry {
    context_window: 200_000,
    images: true,
    computer_use: true,
    cache: Cache::Always,
    input: 3.0,
    output: 15.0,
    cache_writes: Some(3.75),
    cache_reads: Some(0.3),
    ..BASE
};

const CLAUDE_HAIKU_35: ModelCatalogEntry = ModelCatalogEntry {
    context_window: 200_000,
    cache: Cache::Always,
    input: 1.0,
    output: 5.0,
    cache_writes: Some(1.25),
    cache_reads: Some(0.1),
    ..BASE
};

impl ModelCatalogEntry {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            max_tokens: Some(self.max_tokens),
            context_window: self.context_window,
            supports_images: self.images,
            supports_computer_use: self.computer_use,
            supports_prompt_cache: !matches!(self.cache, Cache::No),
            is_prompt_cache_optional: matches!(self.cache, Cache::Optional),
            input_price: Some(self.input),
            output_price: Some(self.output),
            cache_reads_price: self.cache_reads,
            cache_writes_price: self.cache_writes,
            description: None,
        }
    }
}

const ANTHROPIC_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "claude-3-7-sonnet-20250219",
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "claude-3-5-sonnet-20241022",
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "claude-3-5-haiku-20241022",
        ..CLAUDE_HAIKU_35
    },
    ModelCatalogEntry {
        id: "claude-3-opus-20240229",
        max_tokens: 4_096,
        computer_use: false,
        input: 15.0,
        output: 75.0,
        cache_writes: Some(18.75),
        cache_reads: Some(1.5),
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "claude-3-haiku-20240307",
        max_tokens: 4_096,
        computer_use: false,
        input: 0.25,
        output: 1.25,
        cache_writes: Some(0.3),
        cache_reads: Some(0.03),
        ..CLAUDE_37
    },
];

const BEDROCK_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "anthropic.claude-3-7-sonnet-20250219-v1:0",
        cache: Cache::Optional,
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "anthropic.claude-3-5-sonnet-20241022-v2:0",
        cache: Cache::Optional,
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "anthropic.claude-3-5-haiku-20241022-v1:0",
        cache: Cache::Optional,
        input: 0.8,
        output: 4.0,
        cache_writes: Some(1.0),
        cache_reads: Some(0.08),
        ..CLAUDE_HAIKU_35
    },
    ModelCatalogEntry {
        id: "amazon.nova-pro-v1:0",
        max_tokens: 5_000,
        context_window: 300_000,
        images: true,
        cache: Cache::Optional,
        input: 0.8,
        output: 3.2,
        cache_writes: Some(0.8),
        cache_reads: Some(0.2),
        ..BASE
    },
    ModelCatalogEntry {
        id: "amazon.nova-lite-v1:0",
        max_tokens: 5_000,
        context_window: 300_000,
        images: true,
        cache: Cache::Optional,
        input: 0.06,
        output: 0.24,
        cache_writes: Some(0.06),
        cache_reads: Some(0.015),
        ..BASE
    },
    ModelCatalogEntry {
        id: "meta.llama3-3-70b-instruct-v1:0",
        input: 0.72,
        output: 0.72,
        ..BASE
    },
];

const VERTEX_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "claude-3-7-sonnet@20250219",
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "claude-3-5-sonnet-v2@20241022",
        ..CLAUDE_37
    },
    ModelCatalogEntry {
        id: "claude-3-5-haiku@20241022",
        ..CLAUDE_HAIKU_35
    },
    ModelCatalogEntry {
        id: "gemini-2.0-flash-001",
        context_window: 1_048_576,
        images: true,
        input: 0.15,
        output: 0.6,
        ..BASE
    },
    ModelCatalogEntry {
        id: "gemini-1.5-pro-002",
        context_window: 2_097_152,
        images: true,
        input: 1.25,
        output: 5.0,
        ..BASE
    },
];

const GEMINI_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "gemini-2.0-flash-001",
        context_window: 1_048_576,
        images: true,
        input: 0.1,
        output: 0.4,
        ..BASE
    },
    ModelCatalogEntry {
        id: "gemini-2.5-pro-exp-03-25",
        max_tokens: 65_536,
        context_window: 1_048_576,
        images: true,
        ..BASE
    },
    ModelCatalogEntry {
        id: "gemini-2.0-flash-lite-preview-02-05",
        context_window: 1_048_576,
        images: true,
        ..BASE
    },
    ModelCatalogEntry {
        id: "gemini-1.5-flash-002",
        context_window: 1_048_576,
        images: true,
        ..BASE
    },
];

const DEEPSEEK_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "deepseek-chat",
        context_window: 64_000,
        cache: Cache::Always,
        input: 0.27,
        output: 1.1,
        cache_writes: Some(0.27),
        cache_reads: Some(0.07),
        ..BASE
    },
    ModelCatalogEntry {
        id: "deepseek-reasoner",
        context_window: 64_000,
        cache: Cache::Always,
        input: 0.55,
        output: 2.19,
        cache_writes: Some(0.55),
        cache_reads: Some(0.14),
        ..BASE
    },
];

const OPENAI_NATIVE_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "gpt-4.1",
        max_tokens: 32_768,
        context_window: 1_047_576,
        images: true,
        cache: Cache::Always,
        input: 2.0,
        output: 8.0,
        cache_reads: Some(0.5),
        ..BASE
    },
    ModelCatalogEntry {
        id: "gpt-4.1-mini",
        max_tokens: 32_768,
        context_window: 1_047_576,
        images: true,
        cache: Cache::Always,
        input: 0.4,
        output: 1.6,
        cache_reads: Some(0.1),
        ..BASE
    },
    ModelCatalogEntry {
        id: "gpt-4o",
        max_tokens: 16_384,
        images: true,
        cache: Cache::Always,
        input: 2.5,
        output: 10.0,
        cache_reads: Some(1.25),
        ..BASE
    },
    ModelCatalogEntry {
        id: "gpt-4o-mini",
        max_tokens: 16_384,
        images: true,
        cache: Cache::Always,
        input: 0.15,
        output: 0.6,
        cache_reads: Some(0.075),
        ..BASE
    },
    ModelCatalogEntry {
        id: "o3-mini",
        max_tokens: 100_000,
        context_window: 200_000,
        cache: Cache::Always,
        input: 1.1,
        output: 4.4,
        cache_reads: Some(0.55),
        ..BASE
    },
];

const MISTRAL_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "codestral-latest",
        max_tokens: 256_000,
        context_window: 256_000,
        input: 0.3,
        output: 0.9,
        ..BASE
    },
    ModelCatalogEntry {
        id: "mistral-large-latest",
        max_tokens: 131_000,
        context_window: 131_000,
        input: 2.0,
        output: 6.0,
        ..BASE
    },
    ModelCatalogEntry {
        id: "ministral-8b-latest",
        max_tokens: 131_000,
        context_window: 131_000,
        input: 0.1,
        output: 0.1,
        ..BASE
    },
];

const XAI_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "grok-3",
        context_window: 131_072,
        input: 3.0,
        output: 15.0,
        ..BASE
    },
    ModelCatalogEntry {
        id: "grok-3-mini",
        context_window: 131_072,
        input: 0.3,
        output: 0.5,
        ..BASE
    },
    ModelCatalogEntry {
        id: "grok-2-vision-1212",
        context_window: 32_768,
        images: true,
        input: 2.0,
        output: 10.0,
        ..BASE
    },
];

const GROQ_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "llama-3.3-70b-versatile",
        max_tokens: 32_768,
        context_window: 131_072,
        input: 0.59,
        output: 0.79,
        ..BASE
    },
    ModelCatalogEntry {
        id: "llama-3.1-8b-instant",
        max_tokens: 131_072,
        context_window: 131_072,
        input: 0.05,
        output: 0.08,
        ..BASE
    },
    ModelCatalogEntry {
        id: "qwen-qwq-32b",
        max_tokens: 131_072,
        context_window: 131_072,
        input: 0.29,
        output: 0.39,
        ..BASE
    },
];

const CHUTES_MODELS: &[ModelCatalogEntry] = &[
    ModelCatalogEntry {
        id: "deepseek-ai/DeepSeek-R1",
        max_tokens: 32_768,
        context_window: 163_840,
        ..BASE
    },
    ModelCatalogEntry {
        id: "deepseek-ai/DeepSeek-V3",
        max_tokens: 32_768,
        context_window: 163_840,
        ..BASE
    },
    ModelCatalogEntry {
        id: "unsloth/Llama-3.3-70B-Instruct",
        max_tokens: 32_768,
        context_window: 131_072,
        ..BASE
    },
];

const LITELLM_MODELS: &[ModelCatalogEntry] = &[ModelCatalogEntry {
    id: LITELLM_DEFAULT_MODEL_ID,
    max_tokens: 4_096,
    context_window: 16_384,
    ..BASE
}];

fn entries(provider: ProviderName) -> &'static [ModelCatalogEntry] {
    use ProviderName as P;

    match provider {
        P::Anthropic => ANTHROPIC_MODELS,
        P::Bedrock => BEDROCK_MODELS,
        P::Vertex => VERTEX_MODELS,
        P::Gemini => GEMINI_MODELS,
        P::DeepSeek => DEEPSEEK_MODELS,
        P::OpenAiNative => OPENAI_NATIVE_MODELS,
        P::Mistral => MISTRAL_MODELS,
        P::XAi => XAI_MODELS,
        P::Groq => GROQ_MODELS,
        P::Chutes => CHUTES_MODELS,
        P::LiteLlm => LITELLM_MODELS,
        _ => &[],
    }
}

static STATIC_CATALOGS: LazyLock<HashMap<ProviderName, ModelCatalog>> = LazyLock::new(|| {
    ProviderName::ALL
        .into_iter()
        .map(|provider| {
            let catalog = entries(provider)
                .iter()
                .map(|entry| (entry.id.to_string(), entry.info()))
                .collect();
            (provider, catalog)
        })
        .collect()
});

static EMPTY: LazyLock<ModelCatalog> = LazyLock::new(ModelCatalog::new);

/// The compiled-in catalog of `provider`; empty for providers without one.
#[must_use]
pub fn static_catalog(provider: ProviderName) -> &'static ModelCatalog {
    STATIC_CATALOGS.get(&provider).unwrap_or(&EMPTY)
}

/// Record used for OpenAI-compatible endpoints when nothing better is known.
#[must_use]
pub fn openai_compatible_defaults() -> ModelInfo {
    ModelInfo {
        max_tokens: None,
        supports_images: true,
        input_price: Some(0.0),
        output_price: Some(0.0),
        ..ModelInfo::with_context_window(128_000)
    }
}

/// Documented default record of the router providers.
#[must_use]
pub fn router_default_info(provider: ProviderName) -> ModelInfo {
    let description = match provider {
        ProviderName::Requesty => {
            "The best coding model, optimized by Requesty, and automatically routed to the fastest provider."
        },
        _ => {
            "Claude 3.7 Sonnet is an advanced large language model with improved reasoning, coding, and problem-solving capabilities."
        },
    };
    ModelInfo {
        description: Some(description.to_string()),
        ..CLAUDE_37.info()
    }
}

/// Fixed record reported for a custom Bedrock ARN.
#[must_use]
pub fn custom_arn_model_info() -> ModelInfo {
    ModelInfo {
        max_tokens: Some(5_000),
        supports_images: true,
        ..ModelInfo::with_context_window(128_000)
    }
}

/// Fallback record when neither a catalog entry nor an override applies.
///
/// Catalog-backed providers fall back to the record of their default model,
/// everything else to the OpenAI-compatible defaults.
#[must_use]
pub fn sane_defaults(provider: ProviderName) -> ModelInfo {
    use ProviderName as P;

    match provider {
        P::OpenRouter | P::Glama | P::Unbound | P::Requesty => router_default_info(provider),
        P::VsCodeLm => ModelInfo {
            supports_images: false,
            ..openai_compatible_defaults()
        },
        P::OpenAi | P::Ollama | P::LmStudio | P::HumanRelay => openai_compatible_defaults(),
        _ => crate::registry::builtin_default_model_id(provider)
            .and_then(|id| static_catalog(provider).get(id))
            .cloned()
            .unwrap_or_else(openai_compatible_defaults),
    }
}
