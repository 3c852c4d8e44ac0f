//! Conversation Turns
//!
//! The transcript sent to the model on every request. Turns are immutable
//! once appended and only the reasoning loop appends them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::tool::{ToolCallRequest, ToolResult};

/// Role of a turn's author
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// User input
    User,
    /// Model reply (text or tool-call requests)
    Model,
    /// Outcome of one tool call
    ToolResult,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::ToolResult => write!(f, "tool-result"),
        }
    }
}

/// What a turn carries
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnContent {
    /// Free text
    Text { text: String },

    /// Model reply requesting tools, kept verbatim so the model sees its own framing
    ToolCalls {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        text: String,
        calls: Vec<ToolCallRequest>,
    },

    /// Result of one tool call, keyed by tool name
    ToolResult { result: ToolResult },
}

/// A single entry in the transcript
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Turn author
    pub role: Role,

    /// Turn payload
    pub content: TurnContent,

    /// When the triggering event happened
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, content: TurnContent) -> Self {
        Self {
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, TurnContent::Text { text: text.into() })
    }

    /// Create a plain-text model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, TurnContent::Text { text: text.into() })
    }

    /// Create a model turn carrying tool-call requests
    pub fn model_tool_calls(text: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self::new(
            Role::Model,
            TurnContent::ToolCalls {
                text: text.into(),
                calls,
            },
        )
    }

    /// Create a tool-result turn
    pub fn tool_result(result: ToolResult) -> Self {
        Self::new(Role::ToolResult, TurnContent::ToolResult { result })
    }

    /// Text carried by this turn, if any
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TurnContent::Text { text } | TurnContent::ToolCalls { text, .. } => Some(text),
            TurnContent::ToolResult { .. } => None,
        }
    }

    /// Tool-call requests carried by this turn
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match &self.content {
            TurnContent::ToolCalls { calls, .. } => calls,
            _ => &[],
        }
    }
}

/// Conversation State: the ordered transcript
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Append a tool result, checking that the current round's model turn asked for it
    pub(crate) fn push_tool_result(&mut self, result: ToolResult) -> Result<()> {
        let requested = self
            .turns
            .iter()
            .rev()
            .take_while(|t| t.role != Role::User)
            .find(|t| t.role == Role::Model)
            .is_some_and(|t| t.tool_calls().iter().any(|c| c.name == result.name));

        if !requested {
            return Err(AgentError::TranscriptInvariant(format!(
                "result for '{}' has no matching request in this round",
                result.name
            )));
        }

        self.push(Turn::tool_result(result));
        Ok(())
    }

    /// Get all turns
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Get the last turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Remove every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("Hello");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.text(), Some("Hello"));
        assert!(turn.tool_calls().is_empty());
    }

    #[test]
    fn test_tool_result_requires_request() {
        let mut conv = Conversation::new();
        conv.push(Turn::user("find papers"));

        let err = conv
            .push_tool_result(ToolResult::success("search", "[]", json!([])))
            .unwrap_err();
        assert!(matches!(err, AgentError::TranscriptInvariant(_)));

        conv.push(Turn::model_tool_calls(
            "",
            vec![ToolCallRequest::new("search", json!({"query": "x"}))],
        ));
        conv.push_tool_result(ToolResult::success("search", "[]", json!([])))
            .unwrap();

        assert_eq!(conv.len(), 3);
        assert_eq!(conv.last().unwrap().role, Role::ToolResult);
    }

    #[test]
    fn test_request_from_previous_round_does_not_count() {
        let mut conv = Conversation::new();
        conv.push(Turn::user("first"));
        conv.push(Turn::model_tool_calls(
            "",
            vec![ToolCallRequest::new("search", json!({}))],
        ));
        conv.push(Turn::model("done"));
        conv.push(Turn::user("second"));

        assert!(conv
            .push_tool_result(ToolResult::success("search", "[]", json!([])))
            .is_err());
    }

    #[test]
    fn test_turn_serialization() {
        let turn = Turn::model_tool_calls(
            "",
            vec![ToolCallRequest::new("search", json!({"query": "x"}))],
        );
        let value = serde_json::to_value(&turn).unwrap();

        assert_eq!(value["role"], "model");
        assert_eq!(value["content"]["type"], "tool_calls");
        assert_eq!(value["content"]["calls"][0]["name"], "search");
    }
}
