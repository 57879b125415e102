use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{macros::format_description, OffsetDateTime};

use crate::error::{AgentValueError, Result};

const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Connect,
    Disconnect,
    Ping,
    Pong,
    Heartbeat,
    UserMessage,
    StartAgent,
    AgentStarted,
    AgentThinking,
    ToolExecuting,
    ToolCompleted,
    AgentCompleted,
    AgentError,
    Error,
    SystemMessage,
}

/// Kind of value a required payload field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Any,
}

impl MessageType {
    /// The five events every agent run must emit for the golden path.
    pub const CRITICAL_AGENT_EVENTS: [MessageType; 5] = [
        MessageType::AgentStarted,
        MessageType::AgentThinking,
        MessageType::ToolExecuting,
        MessageType::ToolCompleted,
        MessageType::AgentCompleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Connect => "connect",
            MessageType::Disconnect => "disconnect",
            MessageType::Ping => "ping",
            MessageType::Pong => "pong",
            MessageType::Heartbeat => "heartbeat",
            MessageType::UserMessage => "user_message",
            MessageType::StartAgent => "start_agent",
            MessageType::AgentStarted => "agent_started",
            MessageType::AgentThinking => "agent_thinking",
            MessageType::ToolExecuting => "tool_executing",
            MessageType::ToolCompleted => "tool_completed",
            MessageType::AgentCompleted => "agent_completed",
            MessageType::AgentError => "agent_error",
            MessageType::Error => "error",
            MessageType::SystemMessage => "system_message",
        }
    }

    pub fn required_fields(&self) -> &'static [(&'static str, FieldKind)] {
        match self {
            MessageType::UserMessage => &[("content", FieldKind::String)],
            MessageType::StartAgent => &[("user_request", FieldKind::String)],
            MessageType::AgentStarted => &[("agent_name", FieldKind::String)],
            MessageType::AgentThinking => &[("thought", FieldKind::String)],
            MessageType::ToolExecuting => &[("tool_name", FieldKind::String)],
            MessageType::ToolCompleted => {
                &[("tool_name", FieldKind::String), ("result", FieldKind::Any)]
            }
            MessageType::AgentCompleted => &[("result", FieldKind::Any)],
            MessageType::AgentError | MessageType::Error => &[("error", FieldKind::String)],
            MessageType::Connect
            | MessageType::Disconnect
            | MessageType::Ping
            | MessageType::Pong
            | MessageType::Heartbeat
            | MessageType::SystemMessage => &[],
        }
    }

    pub fn is_critical_agent_event(&self) -> bool {
        Self::CRITICAL_AGENT_EVENTS.contains(self)
    }

    /// Checks `payload` carries every field this message type requires.
    pub fn validate_payload(&self, payload: &Map<String, Value>) -> Result<()> {
        for (field, kind) in self.required_fields() {
            match (payload.get(*field), kind) {
                (None, _) | (Some(Value::Null), _) => {
                    return Err(AgentValueError::Validation(format!(
                        "{} payload is missing `{field}`",
                        self.as_str()
                    )));
                }
                (Some(Value::String(_)), FieldKind::String) | (Some(_), FieldKind::Any) => {}
                (Some(_), FieldKind::String) => {
                    return Err(AgentValueError::Validation(format!(
                        "{} payload field `{field}` must be a string",
                        self.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = AgentValueError;

    fn from_str(tag: &str) -> Result<Self> {
        serde_json::from_value(Value::String(tag.to_string()))
            .map_err(|_| AgentValueError::Validation(format!("unknown message type `{tag}`")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: Map<String, Value>,
    pub timestamp: f64,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl WebSocketMessage {
    /// Parses and validates one wire message.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| AgentValueError::Validation("message must be an object".to_string()))?;

        let tag = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentValueError::Validation("message is missing `type`".to_string()))?;
        let message_type: MessageType = tag.parse()?;

        let payload = obj
            .get("payload")
            .and_then(|v| v.as_object())
            .cloned()
            .ok_or_else(|| {
                AgentValueError::Validation(format!("{tag} message needs an object payload"))
            })?;

        let timestamp = obj
            .get("timestamp")
            .and_then(|v| v.as_f64())
            .filter(|ts| ts.is_finite() && *ts >= 0.0)
            .ok_or_else(|| {
                AgentValueError::Validation(format!("{tag} message has no valid timestamp"))
            })?;

        let message_id = obj
            .get("message_id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                AgentValueError::Validation(format!("{tag} message has no message_id"))
            })?
            .to_string();

        let user_id = optional_string(obj, "user_id")?;
        let thread_id = optional_string(obj, "thread_id")?;

        message_type.validate_payload(&payload)?;

        Ok(Self {
            message_type,
            payload,
            timestamp,
            message_id,
            user_id,
            thread_id,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| AgentValueError::Serialization(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| AgentValueError::Serialization(e.to_string()))
    }

    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(|v| v.as_str())
    }

    /// UTC wall-clock rendering of `timestamp`, for logs and reports.
    pub fn timestamp_label(&self) -> String {
        OffsetDateTime::from_unix_timestamp(self.timestamp as i64)
            .ok()
            .and_then(|dt| dt.format(TIMESTAMP_FORMAT).ok())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AgentValueError::Validation(format!(
            "`{field}` must be a string"
        ))),
    }
}

/// Parses a JSON array of wire messages, failing on the first invalid one.
pub fn parse_message_log(raw: &str) -> Result<Vec<WebSocketMessage>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AgentValueError::Serialization(e.to_string()))?;
    let items = value.as_array().ok_or_else(|| {
        AgentValueError::Validation("message log must be a JSON array".to_string())
    })?;
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            WebSocketMessage::from_value(item).map_err(|e| match e {
                AgentValueError::Validation(msg) => {
                    AgentValueError::Validation(format!("message {idx}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_round_trip_through_strings() {
        for tag in ["agent_started", "tool_completed", "user_message", "pong"] {
            let parsed: MessageType = tag.parse().unwrap();
            assert_eq!(parsed.as_str(), tag);
        }
        assert!("agent_exploded".parse::<MessageType>().is_err());
    }

    #[test]
    fn only_the_five_agent_events_are_critical() {
        assert!(MessageType::ToolExecuting.is_critical_agent_event());
        assert!(!MessageType::UserMessage.is_critical_agent_event());
        assert!(!MessageType::AgentError.is_critical_agent_event());
    }

    #[test]
    fn payload_shape_is_checked_per_type() {
        let ok = json!({"tool_name": "cost_analyzer", "result": {"rows": 3}});
        MessageType::ToolCompleted
            .validate_payload(ok.as_object().unwrap())
            .unwrap();

        let missing = json!({"tool_name": "cost_analyzer"});
        let err = MessageType::ToolCompleted
            .validate_payload(missing.as_object().unwrap())
            .unwrap_err();
        assert!(format!("{err}").contains("`result`"));

        let wrong_kind = json!({"content": 42});
        assert!(MessageType::UserMessage
            .validate_payload(wrong_kind.as_object().unwrap())
            .is_err());
    }

    #[test]
    fn timestamp_label_is_utc() {
        let msg = WebSocketMessage::from_value(&json!({
            "type": "heartbeat",
            "payload": {},
            "timestamp": 0,
            "message_id": "hb-1",
        }))
        .unwrap();
        assert_eq!(msg.timestamp_label(), "1970-01-01 00:00:00");
    }

    #[test]
    fn rejects_malformed_envelopes() {
        let base = json!({
            "type": "agent_thinking",
            "payload": {"thought": "checking usage"},
            "timestamp": 1700000000.5,
            "message_id": "m-1",
        });
        assert!(WebSocketMessage::from_value(&base).is_ok());

        let mut no_id = base.clone();
        no_id["message_id"] = json!("");
        assert!(WebSocketMessage::from_value(&no_id).is_err());

        let mut negative_ts = base.clone();
        negative_ts["timestamp"] = json!(-1);
        assert!(WebSocketMessage::from_value(&negative_ts).is_err());

        let mut list_payload = base.clone();
        list_payload["payload"] = json!(["thought"]);
        assert!(WebSocketMessage::from_value(&list_payload).is_err());

        let mut numeric_user = base;
        numeric_user["user_id"] = json!(7);
        assert!(WebSocketMessage::from_value(&numeric_user).is_err());
    }
}
