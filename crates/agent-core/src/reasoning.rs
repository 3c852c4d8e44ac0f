//! Reasoning Loop
//!
//! Drives one round of conversation: ask the model, run the tools it
//! requests, ask again, and resolve to the text shown to the user.
//!
//! A round is at most two model calls (ask → tools → final). Tool requests in
//! the second reply are dropped, which bounds every round.

use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::invoker::ToolInvoker;
use crate::message::{Conversation, Turn};
use crate::provider::{GenerationOptions, ModelProvider, ModelReply};
use crate::registry::ToolRegistry;
use crate::tool::ToolCallRequest;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Generation options (model, sampling, system prompt)
    pub generation: GenerationOptions,

    /// Upper bound on transcript length
    ///
    /// A round is refused before anything is committed once the transcript
    /// holds this many turns. When the first reply requests `k` tools and the
    /// round's remaining `k + 2` turns would cross the bound, the round stops
    /// there with only the user turn committed. Nothing is pruned.
    pub max_transcript_turns: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            max_transcript_turns: Some(DEFAULT_MAX_TRANSCRIPT_TURNS),
        }
    }
}

const DEFAULT_MAX_TRANSCRIPT_TURNS: usize = 500;

/// The main Agent struct
///
/// Holds no conversation state; every round works on a caller-owned
/// [`Conversation`], so one agent can serve many independent sessions.
pub struct Agent {
    provider: Arc<dyn ModelProvider>,
    invoker: ToolInvoker,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(provider: Arc<dyn ModelProvider>, invoker: ToolInvoker, config: AgentConfig) -> Self {
        Self {
            provider,
            invoker,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn ModelProvider>, invoker: ToolInvoker) -> Self {
        Self::new(provider, invoker, AgentConfig::default())
    }

    /// Run one round for a new user message
    ///
    /// Turns are committed as their events happen. A failed model call leaves
    /// the conversation as it was before that call and propagates the error;
    /// tool failures are recorded as tool-result turns and never abort the round.
    pub async fn advance(&self, conversation: &mut Conversation, user_text: &str) -> Result<String> {
        if let Some(max) = self.config.max_transcript_turns {
            if conversation.len() >= max {
                return Err(AgentError::ContextOverflow {
                    turns: conversation.len(),
                    max,
                });
            }
        }

        conversation.push(Turn::user(user_text));

        let reply = self.generate(conversation).await?;

        if !reply.has_tool_calls() {
            conversation.push(Turn::model(reply.text.clone()));
            tracing::info!(tool_calls = 0, turns = conversation.len(), "Round complete");
            return Ok(reply.text);
        }

        let ModelReply { text, tool_calls, .. } = reply;
        if let Some(max) = self.config.max_transcript_turns {
            let needed = conversation.len() + tool_calls.len() + 2;
            if needed > max {
                tracing::warn!(needed, max, "Tool round would overflow the transcript");
                return Err(AgentError::ContextOverflow { turns: needed, max });
            }
        }
        conversation.push(Turn::model_tool_calls(text, tool_calls.clone()));

        let mut trace = Vec::with_capacity(tool_calls.len() + 1);
        for call in &tool_calls {
            trace.push(format_call_trace(call));
            let result = self.invoker.invoke(call).await;
            conversation.push_tool_result(result)?;
        }

        let final_reply = self.generate(conversation).await?;
        if final_reply.has_tool_calls() {
            tracing::warn!(
                ignored = final_reply.tool_calls.len(),
                "Dropping tool calls requested after tool results"
            );
        }

        conversation.push(Turn::model(final_reply.text.clone()));
        tracing::info!(tool_calls = tool_calls.len(), turns = conversation.len(), "Round complete");

        trace.push(final_reply.text);
        Ok(trace.join("\n"))
    }

    async fn generate(&self, conversation: &Conversation) -> Result<ModelReply> {
        tracing::debug!(
            provider = self.provider.name(),
            turns = conversation.len(),
            tools = self.invoker.registry().len(),
            "Calling model"
        );

        self.provider
            .generate(
                conversation.turns(),
                self.invoker.registry().list_tools(),
                &self.config.generation,
            )
            .await
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        self.invoker.registry()
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Transparency line listing one tool call
fn format_call_trace(call: &ToolCallRequest) -> String {
    format!("[Called tool {} with args {}]", call.name, call.arguments)
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn ModelProvider>>,
    invoker: Option<ToolInvoker>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            invoker: None,
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn invoker(mut self, invoker: ToolInvoker) -> Self {
        self.invoker = Some(invoker);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.generation.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = Some(temp);
        self
    }

    pub fn max_transcript_turns(mut self, max: Option<usize>) -> Self {
        self.config.max_transcript_turns = max;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Model provider is required".into()))?;
        let invoker = self
            .invoker
            .ok_or_else(|| AgentError::Config("Tool invoker is required".into()))?;

        Ok(Agent::new(provider, invoker, self.config))
    }
}
