//! JSON extraction from LLM replies.
//!
//! Replies may wrap the JSON in markdown fences or surround it with prose.
//! This module locates the outermost JSON object and parses it strictly into
//! a typed schema; anything that does not fit is an error, never a partial
//! value.

use anyhow::Result;
use serde::de::DeserializeOwned;

/// Parse the JSON object embedded in a raw reply into `T`.
pub fn parse_json_reply<T: DeserializeOwned>(response: &str) -> Result<T> {
    let json_str = extract_json_object(response);

    serde_json::from_str::<T>(json_str).map_err(|e| {
        tracing::warn!("Failed to parse reply JSON: {}. Response: {}", e, response);
        anyhow::anyhow!("response does not match the expected JSON schema: {}", e)
    })
}

/// Locate a JSON object in a reply that may contain extra text.
///
/// Tries, in order:
/// 1. Strip markdown code fences (` ```json ... ``` `)
/// 2. If the cleaned text starts with `{`, take up to its matching `}`
/// 3. Search for the first `{` and take up to its matching `}`
/// 4. Fall back to the cleaned text as-is
pub fn extract_json_object(response: &str) -> &str {
    let stripped = strip_code_fences(response);

    if stripped.starts_with('{')
        && let Some(end) = find_matching_brace(stripped)
    {
        return &stripped[..=end];
    }

    if let Some(start) = stripped.find('{')
        && let Some(end) = find_matching_brace(&stripped[start..])
    {
        return &stripped[start..=start + end];
    }

    stripped
}

/// Strip markdown code fences (``` or ```json) from around content.
fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();

    if s.starts_with("```")
        && let Some(first_newline) = s.find('\n')
    {
        let inner = &s[first_newline + 1..];
        if let Some(closing) = inner.rfind("```") {
            return inner[..closing].trim();
        }
    }

    s
}

/// Byte index of the `}` matching the first `{` in `s`.
///
/// Braces inside string literals are ignored. Returns `None` when unbalanced.
fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        score: u8,
        note: String,
    }

    // ── extract_json_object ─────────────────────────────────────────────

    #[test]
    fn test_extract_clean_object() {
        let input = r#"{"score": 1, "note": "x"}"#;
        assert_eq!(extract_json_object(input), input);
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let input = r#"Sure! Here it is: {"score": 1, "note": "x"} Let me know."#;
        assert_eq!(extract_json_object(input), r#"{"score": 1, "note": "x"}"#);
    }

    #[test]
    fn test_extract_with_markdown_fences() {
        let input = "```json\n{\"score\": 1, \"note\": \"x\"}\n```";
        assert_eq!(extract_json_object(input), "{\"score\": 1, \"note\": \"x\"}");
    }

    #[test]
    fn test_extract_nested_objects() {
        let input = r#"{"a": {"b": {"c": 1}}, "d": 2} trailing"#;
        assert_eq!(extract_json_object(input), r#"{"a": {"b": {"c": 1}}, "d": 2}"#);
    }

    #[test]
    fn test_extract_no_json_returns_text() {
        let input = "I cannot help with that.";
        assert_eq!(extract_json_object(input), input);
    }

    #[test]
    fn test_extract_multibyte_prefix() {
        let input = "Voilà → {\"score\": 2, \"note\": \"é\"}";
        let parsed: Probe = parse_json_reply(input).unwrap();
        assert_eq!(parsed.score, 2);
        assert_eq!(parsed.note, "é");
    }

    // ── find_matching_brace ─────────────────────────────────────────────

    #[test]
    fn test_brace_ignores_braces_in_strings() {
        assert_eq!(find_matching_brace(r#"{"a": "}{"}"#), Some(10));
    }

    #[test]
    fn test_brace_escaped_quote() {
        assert_eq!(find_matching_brace(r#"{"a": "\"}"}"#), Some(11));
    }

    #[test]
    fn test_brace_unbalanced() {
        assert_eq!(find_matching_brace("{\"a\": 1"), None);
    }

    // ── parse_json_reply ────────────────────────────────────────────────

    #[test]
    fn test_parse_rejects_schema_mismatch() {
        assert!(parse_json_reply::<Probe>(r#"{"score": "high", "note": "x"}"#).is_err());
        assert!(parse_json_reply::<Probe>(r#"{"note": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_rejects_truncated_json() {
        assert!(parse_json_reply::<Probe>(r#"{"score": 10, "note": "x""#).is_err());
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_json_reply::<Probe>("no json here").is_err());
    }
}
