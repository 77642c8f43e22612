/// Expand `${NAME}` and `${NAME:-fallback}` placeholders from the process
/// environment.
///
/// Unset variables without a fallback are kept verbatim so the resulting
/// parse error points at the placeholder.
pub fn substitute_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expansion with an injectable lookup, used by [`substitute_env`] and tests.
pub(crate) fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find('}') else {
            // Unterminated placeholder: emit the remainder untouched.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after_open[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after_open[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "APICONF_TEST_URL" => Some("http://proxy:4000".into()),
            _ => None,
        }
    }

    #[test]
    fn expands_known_variable() {
        assert_eq!(
            expand_with("litellm_url = \"${APICONF_TEST_URL}\"", lookup),
            "litellm_url = \"http://proxy:4000\""
        );
    }

    #[test]
    fn uses_fallback_for_unset_variable() {
        assert_eq!(expand_with("${APICONF_MISSING:-250}", lookup), "250");
        assert_eq!(expand_with("${APICONF_TEST_URL:-x}", lookup), "http://proxy:4000");
    }

    #[test]
    fn keeps_unresolved_and_malformed_placeholders() {
        assert_eq!(expand_with("${APICONF_MISSING}", lookup), "${APICONF_MISSING}");
        assert_eq!(expand_with("a ${} b", lookup), "a ${} b");
        assert_eq!(expand_with("tail ${OPEN", lookup), "tail ${OPEN");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(substitute_env("no placeholders $HOME"), "no placeholders $HOME");
    }
}
