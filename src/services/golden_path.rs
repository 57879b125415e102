use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::domains::assessment::BusinessValueAssessment;
use crate::domains::message::{MessageType, WebSocketMessage};
use crate::domains::response::AgentResponse;
use crate::error::{AgentValueError, Result};
use crate::services::validator::{
    default_validator, BusinessValueValidator, DEFAULT_MIN_CHAT_SUBSTANCE, DEFAULT_MIN_SCORE,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventSequenceReport {
    pub total_events: usize,
    pub missing_events: Vec<MessageType>,
    pub ordering_violations: Vec<String>,
    pub unmatched_tools: Vec<String>,
    pub foreign_messages: Vec<String>,
}

impl EventSequenceReport {
    pub fn is_complete(&self) -> bool {
        self.missing_events.is_empty()
            && self.ordering_violations.is_empty()
            && self.unmatched_tools.is_empty()
            && self.foreign_messages.is_empty()
    }
}

impl fmt::Display for EventSequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complete() {
            return write!(f, "{} events, golden path complete", self.total_events);
        }
        let mut parts = Vec::new();
        if !self.missing_events.is_empty() {
            let names: Vec<&str> = self.missing_events.iter().map(|m| m.as_str()).collect();
            parts.push(format!("missing {}", names.join(", ")));
        }
        if !self.ordering_violations.is_empty() {
            parts.push(format!("out of order: {}", self.ordering_violations.join(", ")));
        }
        if !self.unmatched_tools.is_empty() {
            parts.push(format!("unmatched tools: {}", self.unmatched_tools.join(", ")));
        }
        if !self.foreign_messages.is_empty() {
            parts.push(format!(
                "messages for another user: {}",
                self.foreign_messages.join(", ")
            ));
        }
        write!(f, "{} events, {}", self.total_events, parts.join("; "))
    }
}

/// Checks an agent run's event log against the golden path: every critical
/// event present, bracketed by agent_started and agent_completed, each tool
/// call completed, and nothing addressed to a different user.
pub fn check_event_sequence(
    events: &[WebSocketMessage],
    user_id: Option<&str>,
) -> EventSequenceReport {
    let mut report = EventSequenceReport {
        total_events: events.len(),
        ..Default::default()
    };

    report.missing_events = MessageType::CRITICAL_AGENT_EVENTS
        .iter()
        .filter(|kind| !events.iter().any(|e| e.message_type == **kind))
        .copied()
        .collect();

    let first_started = events
        .iter()
        .position(|e| e.message_type == MessageType::AgentStarted);
    let last_completed = events
        .iter()
        .rposition(|e| e.message_type == MessageType::AgentCompleted);

    let mut pending_tools: Vec<(String, String)> = Vec::new();
    for (idx, event) in events.iter().enumerate() {
        if event.message_type.is_critical_agent_event() {
            if first_started.is_some_and(|start| idx < start) {
                report.ordering_violations.push(format!(
                    "{} ({}) before agent_started",
                    event.message_type, event.message_id
                ));
            }
            if last_completed.is_some_and(|end| idx > end) {
                report.ordering_violations.push(format!(
                    "{} ({}) after agent_completed",
                    event.message_type, event.message_id
                ));
            }
        }

        let tool_name = event.payload_str("tool_name").unwrap_or_default();
        match event.message_type {
            MessageType::ToolExecuting => {
                pending_tools.push((tool_name.to_string(), event.message_id.clone()));
            }
            MessageType::ToolCompleted => {
                match pending_tools.iter().position(|(name, _)| name == tool_name) {
                    Some(pos) => {
                        pending_tools.remove(pos);
                    }
                    None => report.unmatched_tools.push(format!(
                        "{tool_name} completed without executing ({})",
                        event.message_id
                    )),
                }
            }
            _ => {}
        }

        if let (Some(expected), Some(actual)) = (user_id, event.user_id.as_deref()) {
            if expected != actual {
                report.foreign_messages.push(event.message_id.clone());
            }
        }
    }

    for (name, message_id) in pending_tools {
        report
            .unmatched_tools
            .push(format!("{name} never completed ({message_id})"));
    }

    report
}

/// `result` payload of the last agent_completed event.
pub fn final_response(events: &[WebSocketMessage]) -> Option<&Value> {
    events
        .iter()
        .rev()
        .find(|e| e.message_type == MessageType::AgentCompleted)
        .and_then(|e| e.payload.get("result"))
}

pub fn assert_golden_path_events(
    events: &[WebSocketMessage],
    user_id: Option<&str>,
) -> Result<EventSequenceReport> {
    let report = check_event_sequence(events, user_id);
    if report.is_complete() {
        info!(events = report.total_events, "golden path events complete");
        Ok(report)
    } else {
        warn!(report = %report, "golden path events incomplete");
        Err(AgentValueError::Assertion(format!(
            "golden path events: {report}"
        )))
    }
}

/// Full golden-path oracle: the event log is complete and the final agent
/// response delivers business value under `validator`'s tables.
pub fn assert_golden_path_with(
    validator: &BusinessValueValidator,
    events: &[WebSocketMessage],
    user_id: Option<&str>,
    user_query: Option<&str>,
    expected_outcomes: Option<&[String]>,
) -> Result<BusinessValueAssessment> {
    assert_golden_path_events(events, user_id)?;
    let response = final_response(events).ok_or_else(|| {
        AgentValueError::Assertion("agent_completed carries no result".to_string())
    })?;
    validator.assert_golden_path_value(
        &AgentResponse::from(response),
        user_query,
        expected_outcomes,
        DEFAULT_MIN_CHAT_SUBSTANCE,
        DEFAULT_MIN_SCORE,
    )
}

/// [`assert_golden_path_with`] over the built-in tables.
pub fn assert_golden_path(
    events: &[WebSocketMessage],
    user_id: Option<&str>,
    user_query: Option<&str>,
    expected_outcomes: Option<&[String]>,
) -> Result<BusinessValueAssessment> {
    assert_golden_path_with(
        default_validator(),
        events,
        user_id,
        user_query,
        expected_outcomes,
    )
}
