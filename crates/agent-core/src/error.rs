//! Error Types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Remote collaborator a transport failure happened against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// The LLM provider
    Model,
    /// The remote tool provider
    ToolProvider,
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Boundary::Model => write!(f, "model provider"),
            Boundary::ToolProvider => write!(f, "tool provider"),
        }
    }
}

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Cannot reach the model or tool provider
    #[error("Transport failure ({boundary}): {message}")]
    Transport { boundary: Boundary, message: String },

    /// Model reply could not be parsed into text or tool-call requests
    #[error("Malformed model reply: {0}")]
    MalformedReply(String),

    /// Tool not found in registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments failed schema checks
    #[error("Invalid arguments: {0}")]
    ArgumentValidation(String),

    /// Tool executed but reported a domain error
    #[error("Tool provider error: {0}")]
    ToolProvider(String),

    /// Transcript reached, or a round would push it past, its configured size
    #[error("Conversation too long: {turns} turns (max: {max})")]
    ContextOverflow { turns: usize, max: usize },

    /// Tool result appended without a matching request
    #[error("Transcript invariant violated: {0}")]
    TranscriptInvariant(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Transport failure against the model provider
    pub fn model_transport(message: impl Into<String>) -> Self {
        Self::Transport {
            boundary: Boundary::Model,
            message: message.into(),
        }
    }

    /// Transport failure against the tool provider
    pub fn tool_transport(message: impl Into<String>) -> Self {
        Self::Transport {
            boundary: Boundary::ToolProvider,
            message: message.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Transport { .. })
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Transport { boundary, message } => format!(
                "Could not reach the {boundary} ({message}). Please try again."
            ),
            AgentError::MalformedReply(msg) => format!(
                "The model provider returned a reply that could not be understood: {msg}. Please try again."
            ),
            AgentError::UnknownTool(name) => format!("The tool '{name}' is not available."),
            AgentError::ArgumentValidation(msg) => format!("Invalid tool input: {msg}"),
            AgentError::ToolProvider(msg) => format!("Tool error: {msg}"),
            AgentError::ContextOverflow { .. } => {
                "The conversation is too long. Please reset the session.".into()
            }
            AgentError::Config(msg) => format!("Configuration problem: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
