//! Model Provider Strategy Pattern
//!
//! Defines a common interface for LLM backends that support native tool
//! calling, so the reasoning loop works with any of them unchanged.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, ModelProvider};
//!
//! let provider = GeminiProvider::from_config(config)?;
//! let reply = provider.generate(conversation.turns(), registry.list_tools(), &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Turn;
use crate::tool::{ToolCallRequest, ToolDescriptor};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gemini-2.5-flash")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// System instruction sent alongside the transcript
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            temperature: None,
            max_tokens: None,
            system_prompt: None,
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One model reply: text plus zero or more tool-call requests
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelReply {
    /// The generated text (may be empty when only tools are requested)
    pub text: String,

    /// Requested tool calls, in the order the model returned them
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,

    /// Model that generated this response
    #[serde(default)]
    pub model: String,

    /// Token usage statistics (if available)
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ModelReply {
    /// Plain-text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Reply requesting tools
    pub fn tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Default::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Strategy trait for model providers
///
/// Implementations must encode the transcript losslessly, including tool-call
/// requests and results, so the model can recall its own prior turns.
/// Connectivity problems are `AgentError::Transport`; replies that cannot be
/// read are `AgentError::MalformedReply`.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a reply from the full transcript and tool catalog
    async fn generate(
        &self,
        transcript: &[Turn],
        catalog: &[ToolDescriptor],
        options: &GenerationOptions,
    ) -> Result<ModelReply>;

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Provider name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.model, "gemini-2.5-flash");
        assert!(opts.temperature.is_none());
        assert!(opts.system_prompt.is_none());
    }

    #[test]
    fn test_reply_constructors() {
        assert!(!ModelReply::text("hi").has_tool_calls());
        assert!(ModelReply::tool_calls(vec![ToolCallRequest::new("search", json!({}))]).has_tool_calls());
    }
}
