//! Tool Invoker
//!
//! Validates a tool-call request against the registry and dispatches it to the
//! tool provider. Every outcome is folded into a [`ToolResult`]; nothing thrown
//! here crosses into the reasoning loop.

use std::sync::Arc;

use crate::error::AgentError;
use crate::registry::ToolRegistry;
use crate::tool::{FailureKind, ToolCallRequest, ToolProvider, ToolResult};

/// Executes tool calls against one provider
#[derive(Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    provider: Arc<dyn ToolProvider>,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>, provider: Arc<dyn ToolProvider>) -> Self {
        Self { registry, provider }
    }

    /// Discover the provider's tools and build an invoker over them
    pub async fn connect(provider: Arc<dyn ToolProvider>) -> crate::Result<Self> {
        let registry = ToolRegistry::discover(provider.as_ref()).await?;
        Ok(Self::new(Arc::new(registry), provider))
    }

    /// The catalog requests are resolved against
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool call: one outbound provider call at most, no retry
    pub async fn invoke(&self, call: &ToolCallRequest) -> ToolResult {
        let descriptor = match self.registry.describe(&call.name) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(tool = %call.name, "Model requested an unknown tool");
                return ToolResult::failure(&call.name, FailureKind::UnknownTool, e.to_string())
                    .with_id(call.id.clone());
            }
        };

        let args = match descriptor.validate(&call.arguments) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool arguments rejected");
                return ToolResult::failure(&call.name, FailureKind::InvalidArguments, e.to_string())
                    .with_id(call.id.clone());
            }
        };

        tracing::debug!(tool = %call.name, args = %args.to_json(), "Executing tool");

        let result = match self.provider.call_tool(&call.name, &args.to_json()).await {
            Ok(output) if output.is_error => {
                tracing::warn!(tool = %call.name, message = %output.text, "Tool reported an error");
                ToolResult::failure(&call.name, FailureKind::Provider, output.text)
            }
            Ok(output) => {
                let data = output
                    .data
                    .unwrap_or_else(|| serde_json::Value::String(output.text.clone()));
                ToolResult::success(&call.name, output.text, data)
            }
            Err(AgentError::Transport { message, .. }) => {
                tracing::warn!(tool = %call.name, error = %message, "Tool provider unreachable");
                ToolResult::failure(&call.name, FailureKind::Transport, message)
            }
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult::failure(&call.name, FailureKind::Provider, e.to_string())
            }
        };

        result.with_id(call.id.clone())
    }
}
