use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Map, Value};
use time::OffsetDateTime;

use crate::domains::message::{MessageType, WebSocketMessage};
use crate::error::{AgentValueError, Result};

static NEXT_MESSAGE: AtomicU64 = AtomicU64::new(1);

fn now_seconds() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

/// Builds well-formed wire messages for one user, for tests and fixtures.
#[derive(Debug, Clone)]
pub struct MessageFactory {
    user_id: String,
    thread_id: Option<String>,
}

impl MessageFactory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            thread_id: None,
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Builds a message of any type, checking the payload shape.
    pub fn build(&self, message_type: MessageType, payload: Value) -> Result<WebSocketMessage> {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(AgentValueError::Validation(format!(
                    "{message_type} payload must be an object"
                )))
            }
        };
        message_type.validate_payload(&payload)?;
        Ok(self.envelope(message_type, payload))
    }

    fn envelope(&self, message_type: MessageType, payload: Map<String, Value>) -> WebSocketMessage {
        let seq = NEXT_MESSAGE.fetch_add(1, Ordering::Relaxed);
        WebSocketMessage {
            message_type,
            payload,
            timestamp: now_seconds(),
            message_id: format!("msg-{}-{seq:08}", self.user_id),
            user_id: Some(self.user_id.clone()),
            thread_id: self.thread_id.clone(),
        }
    }

    fn typed(&self, message_type: MessageType, payload: Value) -> WebSocketMessage {
        let payload = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.envelope(message_type, payload)
    }

    pub fn user_message(&self, content: &str) -> WebSocketMessage {
        self.typed(MessageType::UserMessage, json!({ "content": content }))
    }

    pub fn start_agent(&self, user_request: &str) -> WebSocketMessage {
        self.typed(MessageType::StartAgent, json!({ "user_request": user_request }))
    }

    pub fn agent_started(&self, agent_name: &str) -> WebSocketMessage {
        self.typed(MessageType::AgentStarted, json!({ "agent_name": agent_name }))
    }

    pub fn agent_thinking(&self, thought: &str) -> WebSocketMessage {
        self.typed(MessageType::AgentThinking, json!({ "thought": thought }))
    }

    pub fn tool_executing(&self, tool_name: &str, parameters: Value) -> WebSocketMessage {
        self.typed(
            MessageType::ToolExecuting,
            json!({ "tool_name": tool_name, "parameters": parameters }),
        )
    }

    pub fn tool_completed(&self, tool_name: &str, result: Value) -> WebSocketMessage {
        self.typed(
            MessageType::ToolCompleted,
            json!({ "tool_name": tool_name, "result": result }),
        )
    }

    pub fn agent_completed(&self, agent_name: &str, result: Value) -> WebSocketMessage {
        self.typed(
            MessageType::AgentCompleted,
            json!({ "agent_name": agent_name, "result": result }),
        )
    }

    pub fn agent_error(&self, error: &str) -> WebSocketMessage {
        self.typed(MessageType::AgentError, json!({ "error": error }))
    }

    pub fn heartbeat(&self) -> WebSocketMessage {
        self.typed(MessageType::Heartbeat, json!({}))
    }

    /// The five critical events of one successful agent run, in order.
    pub fn golden_path(
        &self,
        agent_name: &str,
        tool_name: &str,
        final_result: Value,
    ) -> Vec<WebSocketMessage> {
        vec![
            self.agent_started(agent_name),
            self.agent_thinking("reviewing the request"),
            self.tool_executing(tool_name, json!({})),
            self.tool_completed(tool_name, json!({ "status": "ok" })),
            self.agent_completed(agent_name, final_result),
        ]
    }

    /// Untyped wire value, for feeding malformed messages to parsers.
    pub fn raw(&self, type_tag: &str, payload: Value) -> Value {
        let seq = NEXT_MESSAGE.fetch_add(1, Ordering::Relaxed);
        json!({
            "type": type_tag,
            "payload": payload,
            "timestamp": now_seconds(),
            "message_id": format!("msg-{}-{seq:08}", self.user_id),
            "user_id": self.user_id,
        })
    }
}
