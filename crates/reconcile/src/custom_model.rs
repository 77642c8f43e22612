//! Edits of the OpenAI-compatible custom model override.
//!
//! Numeric fields arrive as raw text from an input box. Unparsable integers
//! clear the field so it inherits the default; unparsable prices fall back
//! to the default price. Out-of-range values keep the previous value.

use {
    apiconf_common::{CustomModelInfo, ModelInfo, ProviderName},
    apiconf_providers::sane_defaults,
    tracing::debug,
};

/// One form edit.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomModelEdit {
    MaxTokens(String),
    ContextWindow(String),
    InputPrice(String),
    OutputPrice(String),
    CacheReadsPrice(String),
    CacheWritesPrice(String),
    SupportsImages(bool),
    SupportsComputerUse(bool),
    SupportsPromptCache(bool),
    /// Back to the provider defaults.
    Reset,
}

/// Apply `edit` on top of `current`, or on top of the defaults when there is
/// no override yet.
#[must_use]
pub fn apply_edit(current: Option<&CustomModelInfo>, edit: &CustomModelEdit) -> CustomModelInfo {
    let defaults = sane_defaults(ProviderName::OpenAi);
    let mut info = current
        .cloned()
        .unwrap_or_else(|| CustomModelInfo::from_info(&defaults));

    match edit {
        CustomModelEdit::MaxTokens(raw) => info.max_tokens = parse_size(raw, info.max_tokens),
        CustomModelEdit::ContextWindow(raw) => {
            info.context_window = parse_size(raw, info.context_window);
        },
        CustomModelEdit::InputPrice(raw) => {
            info.input_price = parse_price(raw, info.input_price, defaults.input_price);
        },
        CustomModelEdit::OutputPrice(raw) => {
            info.output_price = parse_price(raw, info.output_price, defaults.output_price);
        },
        CustomModelEdit::CacheReadsPrice(raw) => {
            info.cache_reads_price =
                parse_price(raw, info.cache_reads_price, default_price(&defaults));
        },
        CustomModelEdit::CacheWritesPrice(raw) => {
            info.cache_writes_price =
                parse_price(raw, info.cache_writes_price, default_price(&defaults));
        },
        CustomModelEdit::SupportsImages(on) => info.supports_images = Some(*on),
        CustomModelEdit::SupportsComputerUse(on) => info.supports_computer_use = Some(*on),
        CustomModelEdit::SupportsPromptCache(on) => info.supports_prompt_cache = Some(*on),
        CustomModelEdit::Reset => info = CustomModelInfo::from_info(&defaults),
    }
    info
}

/// Cache prices have no documented default; they fall back like the input
/// price.
fn default_price(defaults: &ModelInfo) -> Option<f64> {
    defaults.input_price
}

fn parse_size(raw: &str, prior: Option<u32>) -> Option<u32> {
    let Ok(value) = raw.trim().parse::<i64>() else {
        return None;
    };
    match u32::try_from(value) {
        Ok(size) if size > 0 => Some(size),
        _ => {
            debug!(value, "ignoring out-of-range size");
            prior
        },
    }
}

fn parse_price(raw: &str, prior: Option<f64>, default: Option<f64>) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Some(price),
        Ok(price) if price.is_finite() => {
            debug!(price, "ignoring negative price");
            prior
        },
        _ => default,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    #[test]
    fn first_edit_starts_from_defaults() {
        let info = apply_edit(None, &CustomModelEdit::ContextWindow("64000".into()));
        assert_eq!(info.context_window, Some(64_000));
        assert_eq!(info.supports_images, Some(true));
        assert_eq!(info.supports_computer_use, None);
        assert_eq!(info.input_price, Some(0.0));
    }

    #[rstest]
    #[case("", None)]
    #[case("abc", None)]
    #[case(" 4096 ", Some(4_096))]
    #[case("0", Some(1_000))]
    #[case("-5", Some(1_000))]
    #[case("99999999999", Some(1_000))]
    fn size_edits(#[case] raw: &str, #[case] expected: Option<u32>) {
        let current = CustomModelInfo {
            max_tokens: Some(1_000),
            ..Default::default()
        };
        let info = apply_edit(Some(&current), &CustomModelEdit::MaxTokens(raw.into()));
        assert_eq!(info.max_tokens, expected);
    }

    #[rstest]
    #[case("2.5", Some(2.5))]
    #[case("oops", Some(0.0))]
    #[case("", Some(0.0))]
    #[case("-1", Some(7.0))]
    #[case("inf", Some(0.0))]
    fn price_edits(#[case] raw: &str, #[case] expected: Option<f64>) {
        let current = CustomModelInfo {
            output_price: Some(7.0),
            ..Default::default()
        };
        let info = apply_edit(Some(&current), &CustomModelEdit::OutputPrice(raw.into()));
        assert_eq!(info.output_price, expected);
    }

    #[test]
    fn flags_and_reset() {
        let info = apply_edit(None, &CustomModelEdit::SupportsComputerUse(true));
        assert_eq!(info.supports_computer_use, Some(true));

        let info = apply_edit(Some(&info), &CustomModelEdit::SupportsPromptCache(true));
        assert_eq!(info.supports_prompt_cache, Some(true));

        let reset = apply_edit(Some(&info), &CustomModelEdit::Reset);
        assert_eq!(reset.supports_computer_use, None);
        assert_eq!(reset.supports_prompt_cache, Some(false));
    }
}
