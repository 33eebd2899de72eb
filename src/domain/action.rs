//! Action items extracted from meeting notes.
//!
//! `ActionItem` is the canonical shape produced by the extraction pipeline.
//! `ActionEntry` is the lenient view the notifier reads back from disk, where
//! any field may be missing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Owner used when the model does not name one
pub const DEFAULT_OWNER: &str = "Unassigned";

/// Due date used when the notes give none (the prompt asks for the same literal)
pub const DEFAULT_DUE_DATE: &str = "None";

/// Status used when the model does not report one
pub const DEFAULT_STATUS: &str = "Unknown";

/// A single action item.
///
/// Fields are declared in alphabetical order so the serialized form has
/// sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// What needs to be done (never empty)
    pub action: String,

    /// Due date as written in the notes, or "None"
    pub due_date: String,

    /// Person responsible
    pub owner: String,

    /// Current status
    pub status: String,
}

impl ActionItem {
    /// Create an item with default owner, due date and status
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            due_date: DEFAULT_DUE_DATE.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// One entry of a per-document result.
///
/// Unreadable documents contribute a single `Error` record instead of items,
/// so callers can always treat a result as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionRecord {
    Item(ActionItem),
    Error { error: String },
}

impl ActionRecord {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn as_item(&self) -> Option<&ActionItem> {
        match self {
            Self::Item(item) => Some(item),
            Self::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl From<ActionItem> for ActionRecord {
    fn from(item: ActionItem) -> Self {
        Self::Item(item)
    }
}

/// Read a field as text: strings as-is, other non-null values in JSON form
pub fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Lenient read-side view of an artifact entry.
///
/// Any JSON value is accepted. Non-string fields are rendered as JSON text,
/// and older artifacts that stored the description under `description` are
/// read when `action` is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct ActionEntry {
    pub action: Option<String>,
    pub owner: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,

    /// Present on sentinel records for unreadable documents
    pub error: Option<String>,
}

impl From<Value> for ActionEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(record) => Self {
                action: text_field(&record, "action")
                    .or_else(|| text_field(&record, "description")),
                owner: text_field(&record, "owner"),
                due_date: text_field(&record, "due_date"),
                status: text_field(&record, "status"),
                error: text_field(&record, "error"),
            },
            Value::String(action) => Self {
                action: Some(action),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

impl From<&ActionItem> for ActionEntry {
    fn from(item: &ActionItem) -> Self {
        Self {
            action: Some(item.action.clone()),
            owner: Some(item.owner.clone()),
            due_date: Some(item.due_date.clone()),
            status: Some(item.status.clone()),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_defaults() {
        let item = ActionItem::new("Send report");
        assert_eq!(item.owner, "Unassigned");
        assert_eq!(item.due_date, "None");
        assert_eq!(item.status, "Unknown");
    }

    #[test]
    fn test_item_serializes_sorted_keys() {
        let item = ActionItem::new("Send report")
            .with_owner("Alice")
            .with_due_date("2024-01-05")
            .with_status("open");

        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"action":"Send report","due_date":"2024-01-05","owner":"Alice","status":"open"}"#
        );
    }

    #[test]
    fn test_record_untagged_serialization() {
        let record = ActionRecord::error("No such file");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"error":"No such file"}"#);

        let parsed: ActionRecord = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_error());
        assert!(parsed.as_item().is_none());

        let item: ActionRecord =
            serde_json::from_str(r#"{"action":"a","due_date":"None","owner":"Bob","status":"open"}"#)
                .unwrap();
        assert_eq!(item.as_item().unwrap().owner, "Bob");
    }

    #[test]
    fn test_entry_accepts_missing_fields_and_description_alias() {
        let entry: ActionEntry =
            serde_json::from_str(r#"{"description":"Book room","owner":"Dana"}"#).unwrap();
        assert_eq!(entry.action.as_deref(), Some("Book room"));
        assert_eq!(entry.owner.as_deref(), Some("Dana"));
        assert!(entry.due_date.is_none());
        assert!(entry.status.is_none());
    }

    #[test]
    fn test_entry_prefers_action_over_description() {
        let entry: ActionEntry =
            serde_json::from_str(r#"{"action":"Current","description":"Legacy"}"#).unwrap();
        assert_eq!(entry.action.as_deref(), Some("Current"));
    }

    #[test]
    fn test_entry_renders_non_string_fields() {
        let entry: ActionEntry = serde_json::from_str(
            r#"{"action":"Ship it","due_date":2024,"owner":null,"status":true}"#,
        )
        .unwrap();

        assert_eq!(entry.due_date.as_deref(), Some("2024"));
        assert!(entry.owner.is_none());
        assert_eq!(entry.status.as_deref(), Some("true"));
    }

    #[test]
    fn test_entry_from_non_object_values() {
        let entry: ActionEntry = serde_json::from_str(r#""Plain text""#).unwrap();
        assert_eq!(entry.action.as_deref(), Some("Plain text"));

        let entry: ActionEntry = serde_json::from_str("42").unwrap();
        assert_eq!(entry, ActionEntry::default());
    }
}
