//! Conversion between the editable header list and the canonical mapping.
//!
//! The edit buffer may hold blank or duplicate keys while the user types;
//! the canonical mapping never does.

use apiconf_config::HeaderMap;

/// One editable `(name, value)` row.
pub type HeaderPair = (String, String);

/// One row per mapping entry, in the mapping's insertion order.
#[must_use]
pub fn decode(mapping: &HeaderMap) -> Vec<HeaderPair> {
    mapping
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Collapse rows into the canonical mapping.
///
/// Keys and values are trimmed and rows with a blank key are dropped. Keys
/// match exactly after trimming (case-sensitive). A repeated key keeps the
/// position of its first row and the value of its last.
#[must_use]
pub fn encode(pairs: &[HeaderPair]) -> HeaderMap {
    let mut mapping = HeaderMap::new();
    for (name, value) in pairs {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        mapping.insert(name.to_string(), value.trim().to_string());
    }
    mapping
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest};

    fn pairs(rows: &[(&str, &str)]) -> Vec<HeaderPair> {
        rows.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn map(rows: &[(&str, &str)]) -> HeaderMap {
        rows.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[rstest]
    #[case(&[("K", "1"), ("K", "2")], &[("K", "2")])]
    #[case(&[("X-A", "1"), ("x-a", " 2 "), ("", "ignored")], &[("X-A", "1"), ("x-a", "2")])]
    #[case(&[("  Auth ", " tok "), ("   ", "blank")], &[("Auth", "tok")])]
    #[case(&[(" K", "1"), ("K ", "2")], &[("K", "2")])]
    #[case(&[], &[])]
    fn encode_cases(#[case] input: &[(&str, &str)], #[case] expected: &[(&str, &str)]) {
        assert_eq!(encode(&pairs(input)), map(expected));
    }

    fn names(rows: &[HeaderPair]) -> Vec<&str> {
        rows.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn decode_follows_insertion_order() {
        let mapping = map(&[("Z-Trace", "1"), ("Authorization", "x"), ("M-Id", "7")]);
        assert_eq!(names(&decode(&mapping)), ["Z-Trace", "Authorization", "M-Id"]);
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let rows = pairs(&[("B", "1"), ("A", "2"), ("B", "3")]);
        let encoded = encode(&rows);
        assert_eq!(names(&decode(&encoded)), ["B", "A"]);
        assert_eq!(encoded["B"], "3");
    }

    #[test]
    fn decode_then_encode_is_identity() {
        let mapping = map(&[("Authorization", "Bearer x"), ("X-Trace", "on")]);
        assert_eq!(encode(&decode(&mapping)), mapping);
    }

    #[test]
    fn encoding_is_idempotent() {
        let rows = pairs(&[("B", " 2"), ("A", "1 "), ("B", "3"), ("", "x")]);
        let once = encode(&rows);
        let twice = encode(&decode(&once));
        assert_eq!(once, twice);
    }
}
