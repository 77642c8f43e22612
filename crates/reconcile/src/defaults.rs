//! Field writes implied by a provider switch or a model choice.

use {
    apiconf_common::ProviderName,
    apiconf_config::{ProviderSettings, non_empty},
    apiconf_providers::{CUSTOM_ARN_MODEL_ID, ModelField, descriptor},
};

/// A default model id to write when switching to `target`.
///
/// Only providers flagged for injection qualify, and only while their model
/// field is absent or empty. A whitespace-only value is kept.
#[must_use]
pub fn resolve_switch_default(
    target: ProviderName,
    settings: &ProviderSettings,
) -> Option<(ModelField, &'static str)> {
    let d = descriptor(target);
    if !d.inject_default_on_switch || !d.model_field.is_plain_string() {
        return None;
    }
    if d.model_field.raw(settings).is_some_and(|id| !id.is_empty()) {
        return None;
    }
    d.default_model_id.map(|id| (d.model_field, id))
}

/// Whether a Bedrock custom ARN must be dropped because a catalog model
/// was chosen instead of the custom-ARN entry.
#[must_use]
pub fn custom_arn_is_stale(settings: &ProviderSettings) -> bool {
    settings.provider() == ProviderName::Bedrock
        && non_empty(settings.aws_custom_arn.as_deref()).is_some()
        && settings.api_model_id.as_deref() != Some(CUSTOM_ARN_MODEL_ID)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(ProviderName::OpenRouter, "openRouterModelId", "anthropic/claude-3.7-sonnet")]
    #[case(ProviderName::Glama, "glamaModelId", "anthropic/claude-3-7-sonnet")]
    #[case(ProviderName::Unbound, "unboundModelId", "anthropic/claude-3-7-sonnet-20250219")]
    #[case(ProviderName::Requesty, "requestyModelId", "coding/claude-3-7-sonnet")]
    fn injects_router_defaults(
        #[case] provider: ProviderName,
        #[case] key: &str,
        #[case] id: &str,
    ) {
        let (field, value) = resolve_switch_default(provider, &ProviderSettings::default()).unwrap();
        assert_eq!(field.key(), key);
        assert_eq!(value, id);
    }

    #[test]
    fn keeps_existing_model_choice() {
        let settings = ProviderSettings {
            open_router_model_id: Some("openai/gpt-4o".into()),
            ..Default::default()
        };
        assert_eq!(resolve_switch_default(ProviderName::OpenRouter, &settings), None);
    }

    #[test]
    fn empty_model_choice_counts_as_unset() {
        let settings = ProviderSettings {
            glama_model_id: Some(String::new()),
            ..Default::default()
        };
        assert!(resolve_switch_default(ProviderName::Glama, &settings).is_some());
    }

    #[test]
    fn whitespace_model_choice_is_kept() {
        let settings = ProviderSettings {
            glama_model_id: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(resolve_switch_default(ProviderName::Glama, &settings), None);
    }

    #[rstest]
    #[case(ProviderName::Anthropic)]
    #[case(ProviderName::OpenAi)]
    #[case(ProviderName::Ollama)]
    #[case(ProviderName::Bedrock)]
    #[case(ProviderName::VsCodeLm)]
    fn other_providers_get_nothing(#[case] provider: ProviderName) {
        assert_eq!(resolve_switch_default(provider, &ProviderSettings::default()), None);
    }

    #[test]
    fn stale_custom_arn() {
        let mut settings = ProviderSettings {
            api_provider: Some(ProviderName::Bedrock),
            api_model_id: Some(CUSTOM_ARN_MODEL_ID.into()),
            aws_custom_arn: Some("arn:aws:bedrock:us-east-1:123:custom-model/x".into()),
            ..Default::default()
        };
        assert!(!custom_arn_is_stale(&settings));

        settings.api_model_id = Some("anthropic.claude-3-7-sonnet-20250219-v1:0".into());
        assert!(custom_arn_is_stale(&settings));

        settings.api_provider = Some(ProviderName::Anthropic);
        assert!(!custom_arn_is_stale(&settings));
    }
}
