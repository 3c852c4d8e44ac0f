//! Conversions between rmcp model types and agent-core types.
//!
//! Shared by the client ([`crate::McpClient`]) and by servers that expose a
//! [`agent_core::ToolProvider`] through rmcp.

use std::sync::Arc;

use agent_core::{AgentError, Result, ToolDescriptor, ToolOutput};
use rmcp::ServiceError;
use rmcp::model::{CallToolResult, Content, RawContent, Tool};
use serde_json::Value;

/// Descriptor for a listed tool; the input schema is kept verbatim
pub fn descriptor_from_tool(tool: &Tool) -> Result<ToolDescriptor> {
    let schema = Value::Object(tool.input_schema.as_ref().clone());
    ToolDescriptor::from_input_schema(
        tool.name.as_ref(),
        tool.description.as_deref().unwrap_or_default(),
        &schema,
    )
}

pub fn tool_from_descriptor(descriptor: &ToolDescriptor) -> Tool {
    let schema = descriptor
        .input_schema()
        .as_object()
        .cloned()
        .unwrap_or_default();

    Tool {
        name: descriptor.name.clone().into(),
        title: None,
        description: Some(descriptor.description.clone().into()),
        input_schema: Arc::new(schema),
        output_schema: None,
        annotations: None,
        execution: None,
        icons: None,
        meta: None,
    }
}

/// Text blocks joined by newlines; other content kinds are dropped
pub fn output_from_result(result: CallToolResult) -> ToolOutput {
    let text = result
        .content
        .iter()
        .filter_map(|content| match &content.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    ToolOutput {
        text,
        data: result.structured_content,
        is_error: result.is_error.unwrap_or(false),
    }
}

pub fn result_from_output(output: ToolOutput) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(output.text)],
        structured_content: output.data,
        is_error: Some(output.is_error),
        meta: None,
    }
}

/// JSON-RPC errors are the server refusing the call; everything else means
/// the server could not be reached or the session is gone
pub fn service_error(err: ServiceError) -> AgentError {
    match err {
        ServiceError::McpError(error) => {
            AgentError::ToolProvider(format!("{} (code {})", error.message, error.code.0))
        }
        other => AgentError::tool_transport(other.to_string()),
    }
}
