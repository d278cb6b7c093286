//! Lenient parsing of language model output
//!
//! Models asked for JSON frequently wrap it in Markdown code fences or pad it
//! with prose. Every call site that parses model output goes through
//! [`parse_or`], which strips fences, attempts a typed parse, and falls back
//! to a caller-supplied total default instead of propagating a parse error.

use serde::de::DeserializeOwned;

/// Parse model output as `T`, returning `fallback` on any parse failure
pub fn parse_or<T: DeserializeOwned>(text: &str, fallback: T) -> T {
    match serde_json::from_str(extract_json(text)) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!("falling back to default, model output did not parse: {err}");
            fallback
        }
    }
}

/// Strip surrounding Markdown code fences from model output
///
/// Handles ```json ... ``` and bare ``` ... ``` blocks; returns the input
/// trimmed when no fence is present.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };

    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        answer: String,
        #[serde(default)]
        confidence: f64,
    }

    fn fallback() -> Answer {
        Answer {
            answer: "n/a".to_string(),
            confidence: 0.0,
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let parsed: Answer = parse_or(r#"{"answer": "yes", "confidence": 0.9}"#, fallback());
        assert_eq!(parsed.answer, "yes");
        assert_eq!(parsed.confidence, 0.9);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"answer\": \"yes\"}\n```";
        let parsed: Answer = parse_or(text, fallback());
        assert_eq!(parsed.answer, "yes");
        assert_eq!(parsed.confidence, 0.0);
    }

    #[test]
    fn test_parse_bare_fence() {
        let text = "```\n{\"answer\": \"yes\"}\n```";
        let parsed: Answer = parse_or(text, fallback());
        assert_eq!(parsed.answer, "yes");
    }

    #[test]
    fn test_fallback_on_prose() {
        let parsed: Answer = parse_or("I could not produce JSON, sorry.", fallback());
        assert_eq!(parsed, fallback());
    }

    #[test]
    fn test_fallback_is_total() {
        // Empty output must still yield a complete value
        let parsed: Answer = parse_or("", fallback());
        assert_eq!(parsed.answer, "n/a");
        assert_eq!(parsed.confidence, 0.0);
    }

    #[test]
    fn test_extract_json_unfenced() {
        assert_eq!(extract_json("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
