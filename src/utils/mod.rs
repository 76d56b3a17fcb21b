use std::borrow::Cow;

/// Percent-encodes a value for use inside a path segment or query value.
pub fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Inverse of [`encode_component`]. Malformed escapes leave the input as is.
pub fn decode_component(value: &str) -> String {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| value.to_string())
}

/// At most `max` characters of `text`, for log lines.
pub fn preview(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_round_trip() {
        for raw in ["123", "one piece", "a/b?ep=1#x", "ナルト"] {
            assert_eq!(decode_component(&encode_component(raw)), raw);
        }
        assert_eq!(encode_component("one piece"), "one%20piece");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("héllo", 2), "hé");
        assert_eq!(preview("abc", 10), "abc");
    }
}
