use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields probed, in order, when a structured response carries its text.
pub const TEXT_FIELDS: [&str; 6] = ["content", "text", "message", "response", "result", "output"];

/// An agent response as handed to the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentResponse {
    Text(String),
    Structured(Value),
}

impl AgentResponse {
    /// Text the heuristics run over, or `None` when there is nothing to score.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            AgentResponse::Text(text) => text.clone(),
            AgentResponse::Structured(value) => value_text(value)?,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => {
            let field = TEXT_FIELDS
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|v| !v.is_null());
            match field {
                Some(Value::String(text)) => Some(text.clone()),
                Some(other) => Some(other.to_string()),
                None => Some(value.to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

impl From<&str> for AgentResponse {
    fn from(text: &str) -> Self {
        AgentResponse::Text(text.to_string())
    }
}

impl From<String> for AgentResponse {
    fn from(text: String) -> Self {
        AgentResponse::Text(text)
    }
}

impl From<Value> for AgentResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => AgentResponse::Text(text),
            other => AgentResponse::Structured(other),
        }
    }
}

impl From<&Value> for AgentResponse {
    fn from(value: &Value) -> Self {
        AgentResponse::from(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_first_text_field_in_order() {
        let response = AgentResponse::from(json!({
            "output": "last",
            "message": "middle",
            "text": "second",
        }));
        assert_eq!(response.text().as_deref(), Some("second"));
    }

    #[test]
    fn skips_null_fields_and_serializes_non_strings() {
        let response = AgentResponse::from(json!({"content": null, "result": {"savings": 12}}));
        assert_eq!(response.text().as_deref(), Some(r#"{"savings":12}"#));
    }

    #[test]
    fn serializes_objects_without_text_fields() {
        let response = AgentResponse::from(json!({"status": "ok"}));
        assert_eq!(response.text().as_deref(), Some(r#"{"status":"ok"}"#));
    }

    #[test]
    fn empty_and_null_have_no_text() {
        assert_eq!(AgentResponse::from("   ").text(), None);
        assert_eq!(AgentResponse::from(Value::Null).text(), None);
        assert_eq!(AgentResponse::from(json!({"content": ""})).text(), None);
    }
}
