//! Normalize raw model output into canonical action items.
//!
//! Accepted shapes:
//! - structured records returned directly by the backend
//! - `{"items": [...]}` as bare JSON or inside a ```json fence
//! - a bare JSON array, taken as the items list
//!
//! `parse_response` reports failures as a `ParseError`; `normalize` logs them
//! and falls back to an empty list.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::adapters::ModelResponse;
use crate::domain::action::{
    text_field, ActionItem, DEFAULT_DUE_DATE, DEFAULT_OWNER, DEFAULT_STATUS,
};

/// Key the schema wraps the records in
pub const ITEMS_KEY: &str = "items";

/// Legacy key some models use instead of `action`
pub const LEGACY_ACTION_KEY: &str = "actions";

/// Ways a model response can fail to match the declared schema
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Response is empty")]
    Empty,

    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object or array, got {0}")]
    UnexpectedShape(&'static str),

    #[error("Field `items` must be an array, got {0}")]
    ItemsNotArray(&'static str),
}

/// Parse a response into action items
pub fn parse_response(response: &ModelResponse) -> Result<Vec<ActionItem>, ParseError> {
    match response {
        ModelResponse::Records(records) => Ok(normalize_records(records.iter().cloned())),
        ModelResponse::Text(text) => parse_text(text),
    }
}

/// Parse a response, logging and swallowing any parse failure
pub fn normalize(response: &ModelResponse) -> Vec<ActionItem> {
    match parse_response(response) {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "Failed to parse model response");
            Vec::new()
        }
    }
}

/// Express already-normalized items as a structured response
pub fn records_from_items(items: &[ActionItem]) -> ModelResponse {
    let records = items
        .iter()
        .filter_map(|item| match serde_json::to_value(item) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect();
    ModelResponse::Records(records)
}

fn parse_text(text: &str) -> Result<Vec<ActionItem>, ParseError> {
    let json_str = extract_json(text);
    if json_str.is_empty() {
        return Err(ParseError::Empty);
    }

    let value: Value = serde_json::from_str(json_str)?;

    let records = match value {
        Value::Object(mut object) => match object.remove(ITEMS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(ParseError::ItemsNotArray(type_name(&other))),
        },
        Value::Array(items) => items,
        other => return Err(ParseError::UnexpectedShape(type_name(&other))),
    };

    let objects = records.into_iter().enumerate().filter_map(|(idx, record)| match record {
        Value::Object(map) => Some(map),
        other => {
            warn!(index = idx, kind = type_name(&other), "Skipping non-object item");
            None
        }
    });

    Ok(normalize_records(objects))
}

/// Strip a markdown code fence if the response has one
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_fence = &trimmed[start + 3..];
    // Skip the language tag line (```json)
    let body = match after_fence.find('\n') {
        Some(newline) => &after_fence[newline + 1..],
        None => after_fence,
    };

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn normalize_records(records: impl IntoIterator<Item = Map<String, Value>>) -> Vec<ActionItem> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, mut record)| {
            if let Some(legacy) = record.remove(LEGACY_ACTION_KEY) {
                record.insert("action".to_string(), legacy);
            }

            let item = to_action_item(&record);
            if item.is_none() {
                warn!(index = idx, "Skipping item without an action description");
            }
            item
        })
        .collect()
}

fn to_action_item(record: &Map<String, Value>) -> Option<ActionItem> {
    let action = text_field(record, "action").filter(|a| !a.trim().is_empty())?;

    Some(ActionItem {
        action,
        due_date: text_field(record, "due_date").unwrap_or_else(|| DEFAULT_DUE_DATE.to_string()),
        owner: text_field(record, "owner").unwrap_or_else(|| DEFAULT_OWNER.to_string()),
        status: text_field(record, "status").unwrap_or_else(|| DEFAULT_STATUS.to_string()),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> ModelResponse {
        let Value::Array(items) = value else {
            panic!("expected array");
        };
        ModelResponse::Records(
            items
                .into_iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect(),
        )
    }

    #[test]
    fn test_structured_records_pass_through() {
        let response = records(json!([
            {"action": "Send report", "owner": "Alice", "due_date": "2024-01-05", "status": "open"}
        ]));

        let items = normalize(&response);
        assert_eq!(
            items,
            vec![ActionItem::new("Send report")
                .with_owner("Alice")
                .with_due_date("2024-01-05")
                .with_status("open")]
        );
    }

    #[test]
    fn test_fenced_items_object() {
        let response = ModelResponse::text(
            "Here you go:\n```json\n{\n\t\"items\": [{\"action\": \"Book room\", \"owner\": \"Dana\", \"due_date\": \"None\", \"status\": \"pending\"}]\n}\n```\n",
        );

        let items = parse_response(&response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].action, "Book room");
        assert_eq!(items[0].owner, "Dana");
    }

    #[test]
    fn test_bare_array_is_items_list() {
        let response = ModelResponse::text(
            r#"[{"action":"A","owner":"X","due_date":"None","status":"open"},{"action":"B"}]"#,
        );

        let items = parse_response(&response).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], ActionItem::new("B"));
    }

    #[test]
    fn test_missing_items_key_is_empty() {
        let items = parse_response(&ModelResponse::text(r#"{"other": 1}"#)).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_legacy_actions_key_is_renamed() {
        let text = ModelResponse::text(r#"{"items": [{"actions": "Ship it", "owner": "Sam"}]}"#);
        let items = parse_response(&text).unwrap();
        assert_eq!(items[0].action, "Ship it");

        let structured = records(json!([{"actions": "Ship it"}]));
        let items = parse_response(&structured).unwrap();
        assert_eq!(items[0].action, "Ship it");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let items = parse_response(&ModelResponse::text(r#"{"items": [{"action": "Call vendor"}]}"#))
            .unwrap();
        assert_eq!(items[0].owner, "Unassigned");
        assert_eq!(items[0].due_date, "None");
        assert_eq!(items[0].status, "Unknown");
    }

    #[test]
    fn test_records_without_action_are_dropped() {
        let response = ModelResponse::text(
            r#"{"items": [{"owner": "Nobody"}, {"action": "  "}, "stray", {"action": "Keep"}]}"#,
        );
        let items = parse_response(&response).unwrap();
        assert_eq!(items, vec![ActionItem::new("Keep")]);
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let items = parse_response(&ModelResponse::text(
            r#"{"items": [{"action": "Renew", "due_date": 2024, "status": null}]}"#,
        ))
        .unwrap();
        assert_eq!(items[0].due_date, "2024");
        assert_eq!(items[0].status, "Unknown");
    }

    #[test]
    fn test_invalid_text_is_parse_error_and_normalizes_to_empty() {
        let response = ModelResponse::text("not-json");
        assert!(matches!(
            parse_response(&response),
            Err(ParseError::InvalidJson(_))
        ));
        assert!(normalize(&response).is_empty());
    }

    #[test]
    fn test_wrong_shapes_are_parse_errors() {
        assert!(matches!(
            parse_response(&ModelResponse::text("   ")),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            parse_response(&ModelResponse::text("\"just a string\"")),
            Err(ParseError::UnexpectedShape("string"))
        ));
        assert!(matches!(
            parse_response(&ModelResponse::text(r#"{"items": "nope"}"#)),
            Err(ParseError::ItemsNotArray("string"))
        ));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let response = ModelResponse::text(
            r#"{"items": [{"actions": "A"}, {"action": "B", "owner": "Kim", "status": "done"}]}"#,
        );

        let once = normalize(&response);
        let twice = normalize(&records_from_items(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_legacy_key_survives() {
        let response = records(json!([{"actions": "A"}, {"action": "B", "actions": "C"}]));
        let ModelResponse::Records(out) = records_from_items(&normalize(&response)) else {
            unreachable!()
        };
        assert!(out.iter().all(|r| !r.contains_key(LEGACY_ACTION_KEY)));
    }
}
