//! Normalizes generateContent payloads of varying shape into
//! [`MeetingMinutes`].

use serde_json::Value;
use tracing::warn;

use crate::core::{MeetingMinutes, ParseMode};
use crate::error::ParseError;

/// Locates the model's text output inside a payload of unknown shape.
/// First match wins: the SDK-style top-level `text` field, then the REST
/// candidate path.
pub fn extract_payload_text(payload: &Value) -> Option<String> {
    if let Some(text) = payload.get("text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    payload
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .map(|text| text.to_string())
}

/// Extracts and parses a payload into minutes. Strict mode fails on an
/// unrecognizable shape; best-effort substitutes an empty object, the
/// behavior the original web app shipped with.
pub fn normalize(payload: &Value, mode: ParseMode) -> Result<MeetingMinutes, ParseError> {
    let text = match extract_payload_text(payload) {
        Some(text) => text,
        None => match mode {
            ParseMode::Strict => return Err(ParseError::MissingText),
            ParseMode::BestEffort => {
                warn!("unrecognized response shape, substituting empty payload");
                "{}".to_string()
            }
        },
    };
    parse_minutes(&text, mode)
}

pub fn parse_minutes(text: &str, mode: ParseMode) -> Result<MeetingMinutes, ParseError> {
    match mode {
        ParseMode::Strict => {
            let value: Value = serde_json::from_str(text)?;
            Ok(MeetingMinutes {
                category: required_field(&value, "category")?,
                quick_summary: required_field(&value, "quickSummary")?,
                styled_content: required_field(&value, "styledContent")?,
            })
        }
        ParseMode::BestEffort => {
            let value: Value = serde_json::from_str(text).unwrap_or_else(|err| {
                warn!(error = %err, "response text is not valid JSON, degrading to empty defaults");
                Value::Object(Default::default())
            });
            Ok(MeetingMinutes {
                category: lenient_field(&value, "category"),
                quick_summary: lenient_field(&value, "quickSummary"),
                styled_content: lenient_field(&value, "styledContent"),
            })
        }
    }
}

fn required_field(value: &Value, name: &'static str) -> Result<String, ParseError> {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(|field| field.to_string())
        .ok_or(ParseError::MissingField(name))
}

fn lenient_field(value: &Value, name: &str) -> String {
    value
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAYLOAD_TEXT: &str =
        r#"{"category":"Daily","quickSummary":"Sync","styledContent":"<h2>Daily</h2>"}"#;

    fn expected() -> MeetingMinutes {
        MeetingMinutes {
            category: "Daily".into(),
            quick_summary: "Sync".into(),
            styled_content: "<h2>Daily</h2>".into(),
        }
    }

    #[test]
    fn extracts_from_rest_candidate_path() {
        let payload = json!({
            "candidates": [{
                "content": { "parts": [{ "text": PAYLOAD_TEXT }] }
            }]
        });
        assert_eq!(normalize(&payload, ParseMode::Strict).unwrap(), expected());
    }

    #[test]
    fn extracts_from_top_level_text_field() {
        let payload = json!({ "text": PAYLOAD_TEXT });
        assert_eq!(normalize(&payload, ParseMode::Strict).unwrap(), expected());
    }

    #[test]
    fn top_level_text_wins_over_candidates() {
        let payload = json!({
            "text": PAYLOAD_TEXT,
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
        });
        assert_eq!(normalize(&payload, ParseMode::Strict).unwrap(), expected());
    }

    #[test]
    fn strict_mode_fails_on_unknown_shape() {
        let payload = json!({ "something": "else" });
        assert!(matches!(
            normalize(&payload, ParseMode::Strict),
            Err(ParseError::MissingText)
        ));
    }

    #[test]
    fn strict_mode_fails_on_invalid_json_text() {
        let payload = json!({ "text": "not json at all" });
        assert!(matches!(
            normalize(&payload, ParseMode::Strict),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn strict_mode_fails_on_partial_payload() {
        let payload = json!({ "text": r#"{"category":"Daily"}"# });
        assert!(matches!(
            normalize(&payload, ParseMode::Strict),
            Err(ParseError::MissingField("quickSummary"))
        ));
    }

    #[test]
    fn best_effort_degrades_invalid_json_to_empty_defaults() {
        let payload = json!({ "text": "not json at all" });
        let minutes = normalize(&payload, ParseMode::BestEffort).unwrap();
        assert_eq!(minutes.category, "");
        assert_eq!(minutes.quick_summary, "");
        assert_eq!(minutes.styled_content, "");
    }

    #[test]
    fn best_effort_degrades_unknown_shape_to_empty_defaults() {
        let payload = json!({ "something": "else" });
        let minutes = normalize(&payload, ParseMode::BestEffort).unwrap();
        assert_eq!(minutes, MeetingMinutes {
            category: String::new(),
            quick_summary: String::new(),
            styled_content: String::new(),
        });
    }

    #[test]
    fn best_effort_keeps_fields_it_can_read() {
        let payload = json!({ "text": r#"{"category":"Daily","quickSummary":7}"# });
        let minutes = normalize(&payload, ParseMode::BestEffort).unwrap();
        assert_eq!(minutes.category, "Daily");
        assert_eq!(minutes.quick_summary, "");
    }
}
