//! Transcript entries and the wire shapes of the backend contract.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Assistant text used when the backend omits `response_text`.
pub const RESPONSE_PLACEHOLDER: &str = "Command processed.";

/// Assistant text used when a command request fails for any reason.
pub const COMMAND_ERROR_TEXT: &str = "Error processing command.";

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Full backend payload; only on assistant replies that carried one.
    pub detail: Option<CommandResponse>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    /// An assistant message without structured detail.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            detail: None,
            timestamp: Utc::now(),
        }
    }

    /// The assistant message produced by a successful command response.
    ///
    /// Text falls back to [`RESPONSE_PLACEHOLDER`]; detail is kept only when
    /// the payload has any content.
    pub fn from_response(response: CommandResponse) -> Self {
        let text = response.display_text().to_string();
        let detail = (!response.is_empty()).then_some(response);
        Self {
            role: Role::Assistant,
            text,
            detail,
            timestamp: Utc::now(),
        }
    }

    /// The assistant message produced by a failed command request.
    pub fn command_error() -> Self {
        Self::assistant(COMMAND_ERROR_TEXT)
    }

    /// Intent classification carried in the detail, if any.
    pub fn intent_type(&self) -> Option<&str> {
        self.detail
            .as_ref()
            .and_then(|d| d.intent.as_ref())
            .map(|i| i.kind.as_str())
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Body of `POST /command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

/// Body returned by `POST /command`.
///
/// Only `response_text` and `intent` are interpreted. Everything else the
/// backend sends (`transcript`, `result`, ...) is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommandResponse {
    /// Text to show for this response. An empty `response_text` counts as absent.
    pub fn display_text(&self) -> &str {
        self.response_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(RESPONSE_PLACEHOLDER)
    }

    /// True when the payload carries nothing worth attaching as detail.
    pub fn is_empty(&self) -> bool {
        self.response_text.is_none() && self.intent.is_none() && self.extra.is_empty()
    }

    /// Look up an uninterpreted top-level field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Backend classification of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Configuration reported by `GET /config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub profile: String,

    /// App slot (e.g. `task_app`) to configured handler (e.g. `todoist`).
    #[serde(default)]
    pub routing: BTreeMap<String, String>,
}

impl ConfigSnapshot {
    /// Profile name used by the backend's strict offline mode.
    pub const OFFLINE_ONLY: &'static str = "OFFLINE_ONLY";

    pub fn is_offline_only(&self) -> bool {
        self.profile == Self::OFFLINE_ONLY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_with_text_and_intent() {
        let response: CommandResponse = serde_json::from_value(json!({
            "response_text": "Added task.",
            "intent": {"type": "create_task", "title": "buy milk"},
            "transcript": "buy milk"
        }))
        .unwrap();

        let msg = Message::from_response(response);
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text, "Added task.");
        assert_eq!(msg.intent_type(), Some("create_task"));

        let detail = msg.detail.unwrap();
        assert_eq!(detail.field("transcript"), Some(&json!("buy milk")));
        assert_eq!(detail.intent.unwrap().fields.get("title"), Some(&json!("buy milk")));
    }

    #[test]
    fn test_missing_or_empty_text_uses_placeholder() {
        let missing: CommandResponse =
            serde_json::from_value(json!({"intent": {"type": "chat"}})).unwrap();
        assert_eq!(Message::from_response(missing).text, RESPONSE_PLACEHOLDER);

        let empty: CommandResponse =
            serde_json::from_value(json!({"response_text": "", "status": "ok"})).unwrap();
        assert_eq!(Message::from_response(empty).text, RESPONSE_PLACEHOLDER);

        let null: CommandResponse =
            serde_json::from_value(json!({"response_text": null})).unwrap();
        assert_eq!(null.display_text(), RESPONSE_PLACEHOLDER);
    }

    #[test]
    fn test_empty_payload_has_no_detail() {
        let response: CommandResponse = serde_json::from_value(json!({})).unwrap();
        let msg = Message::from_response(response);
        assert_eq!(msg.text, RESPONSE_PLACEHOLDER);
        assert!(msg.detail.is_none());
        assert_eq!(msg.intent_type(), None);
    }

    #[test]
    fn test_intent_requires_type() {
        let result: Result<CommandResponse, _> =
            serde_json::from_value(json!({"intent": {"confidence": 0.3}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_command_error_message() {
        let msg = Message::command_error();
        assert_eq!(msg.text, COMMAND_ERROR_TEXT);
        assert!(msg.detail.is_none());
        assert!(!msg.is_user());
    }

    #[test]
    fn test_config_snapshot_ignores_unknown_fields() {
        let snapshot: ConfigSnapshot = serde_json::from_value(json!({
            "profile": "HYBRID",
            "storage_path": "data",
            "routing": {"task_app": "todoist", "notes_app": "local"},
            "api": {"require_auth": true}
        }))
        .unwrap();

        assert_eq!(snapshot.profile, "HYBRID");
        assert!(!snapshot.is_offline_only());
        assert_eq!(snapshot.routing.get("task_app").map(String::as_str), Some("todoist"));
        assert_eq!(snapshot.routing.len(), 2);
    }
}
