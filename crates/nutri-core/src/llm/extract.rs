//! Pulls a JSON value out of free-form model output.
//!
//! Models asked for JSON usually wrap it in a markdown fence, sometimes tag the
//! fence, and sometimes just surround a bare object with chatter. The lookup
//! order is fixed:
//!
//! 1. a ```` ```json ```` fence with a closing fence,
//! 2. any ```` ``` ```` fence with a closing fence,
//! 3. the span from the first `{` to the last `}`.
//!
//! A fence that is found but does not contain valid JSON ends the search:
//! the brace scan only runs when the text has no complete fence at all.

use serde_json::Value;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Extract a JSON value from model text. Returns `None` instead of failing.
pub fn extract_json(text: Option<&str>) -> Option<Value> {
    let text = text?;
    if text.is_empty() {
        return None;
    }

    if let Some(body) = fenced_body(text, JSON_FENCE) {
        return parse(body);
    }
    if let Some(body) = fenced_body(text, FENCE) {
        return parse(body);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse(&text[start..=end])
}

/// Text between the first `opener` and the next closing fence, if both exist.
fn fenced_body<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)? + opener.len();
    let len = text[start..].find(FENCE)?;
    if len == 0 {
        return None;
    }
    Some(text[start..start + len].trim())
}

fn parse(candidate: &str) -> Option<Value> {
    match serde_json::from_str(candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!("JSON extraction failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_fence() {
        let text = "```json\n{\"a\":1}\n```";
        assert_eq!(extract_json(Some(text)), Some(json!({"a": 1})));
    }

    #[test]
    fn test_untagged_fence() {
        let text = "```\n{\"a\":1}\n```";
        assert_eq!(extract_json(Some(text)), Some(json!({"a": 1})));
    }

    #[test]
    fn test_bare_braces_with_noise() {
        assert_eq!(
            extract_json(Some("noise {\"a\":1} noise")),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_malformed_tagged_fence_is_absent() {
        assert_eq!(extract_json(Some("```json\nnot json\n```")), None);
    }

    #[test]
    fn test_malformed_fence_does_not_fall_back_to_braces() {
        let text = "```json\n{broken\n```\nbut here: {\"a\": 1}";
        assert_eq!(extract_json(Some(text)), None);
    }

    #[test]
    fn test_empty_and_missing_input() {
        assert_eq!(extract_json(Some("")), None);
        assert_eq!(extract_json(None), None);
    }

    #[test]
    fn test_no_json_at_all() {
        assert_eq!(extract_json(Some("I could not identify the dish.")), None);
        assert_eq!(extract_json(Some("} backwards {")), None);
    }

    #[test]
    fn test_tagged_fence_preferred_over_earlier_untagged_fence() {
        let text = "```\nplain\n```\nthen\n```json\n{\"dish_name\": \"soup\"}\n```";
        assert_eq!(
            extract_json(Some(text)),
            Some(json!({"dish_name": "soup"}))
        );
    }

    #[test]
    fn test_unterminated_fence_falls_through_to_braces() {
        let text = "```json\n{\"a\": [1, 2]}";
        assert_eq!(extract_json(Some(text)), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_array_inside_fence() {
        let text = "Here you go:\n```json\n[1, 2, 3]\n```";
        assert_eq!(extract_json(Some(text)), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_nested_object_with_prose() {
        let text = "Sure! {\"macronutrients\": {\"calories\": 320}} Enjoy.";
        assert_eq!(
            extract_json(Some(text)),
            Some(json!({"macronutrients": {"calories": 320}}))
        );
    }
}
