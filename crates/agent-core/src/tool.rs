//! Tool System
//!
//! Descriptors, call requests and results exchanged with the model and the
//! tool provider, plus the `Tool` trait for in-process tool implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::schema::{ParameterSchema, ValidatedArgs};

/// Tool call request from the model
///
/// Arguments are raw JSON until the invoker validates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Tool identifier
    pub name: String,

    /// Arguments as produced by the model
    #[serde(default)]
    pub arguments: Value,

    /// Optional call ID assigned by the model provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Opaque provider token that must be sent back with this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: None,
            signature: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// Why a tool call produced no payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Name not in the registry
    UnknownTool,
    /// Arguments failed the schema check
    InvalidArguments,
    /// Tool ran and reported a domain error
    Provider,
    /// Tool provider could not be reached
    Transport,
}

/// Success payload or failure marker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success {
        /// Pre-rendered text form
        text: String,
        /// Opaque structured data
        data: Value,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

/// Result of one tool call, keyed by tool name
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// What happened
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, text: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            id: None,
            outcome: ToolOutcome::Success {
                text: text.into(),
                data,
            },
        }
    }

    pub fn failure(name: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            outcome: ToolOutcome::Failure {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success { .. })
    }

    /// Failure kind, `None` on success
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            ToolOutcome::Failure { kind, .. } => Some(*kind),
            ToolOutcome::Success { .. } => None,
        }
    }

    /// Rendered text on success, error message on failure
    pub fn text(&self) -> &str {
        match &self.outcome {
            ToolOutcome::Success { text, .. } => text,
            ToolOutcome::Failure { message, .. } => message,
        }
    }
}

/// Raw output of a tool provider call
///
/// `is_error` marks a domain-level failure reported by the tool itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default)]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
            is_error: false,
        }
    }

    /// Structured output, rendered as pretty JSON
    pub fn json(data: Value) -> Self {
        Self {
            text: serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()),
            data: Some(data),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            text: message.into(),
            data: None,
            is_error: true,
        }
    }
}

/// Tool definition schema (advertised to the model)
///
/// The JSON Schema is kept exactly as the provider listed it and is what the
/// model sees; the parsed parameters only drive argument validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    /// Parameter definitions
    parameters: Vec<ParameterSchema>,

    #[serde(rename = "inputSchema")]
    schema: Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Vec<ParameterSchema>,
    ) -> Self {
        let schema = render_schema(&parameters);
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            schema,
        }
    }

    /// Build from the JSON Schema object a tool provider lists
    pub fn from_input_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        schema: &Value,
    ) -> Result<Self> {
        let name = name.into();
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let parameters = match schema.get("properties") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(properties)) => properties
                .iter()
                .map(|(key, prop)| ParameterSchema::from_property(key, prop, required.contains(&key.as_str())))
                .collect(),
            Some(_) => {
                return Err(AgentError::Config(format!(
                    "tool '{name}' has a non-object 'properties' schema"
                )));
            }
        };

        Ok(Self {
            name,
            description: description.into(),
            parameters,
            schema: schema.clone(),
        })
    }

    /// JSON Schema object for the arguments
    pub fn input_schema(&self) -> &Value {
        &self.schema
    }

    pub fn parameters(&self) -> &[ParameterSchema] {
        &self.parameters
    }

    /// Validate raw arguments against this descriptor
    pub fn validate(&self, arguments: &Value) -> Result<ValidatedArgs> {
        ValidatedArgs::validate(&self.parameters, arguments)
    }
}

fn render_schema(parameters: &[ParameterSchema]) -> Value {
    let properties: serde_json::Map<String, Value> = parameters
        .iter()
        .map(|p| (p.name.clone(), p.to_property()))
        .collect();
    let required: Vec<&str> = parameters
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's descriptor
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with already validated arguments
    async fn execute(&self, args: &ValidatedArgs) -> Result<ToolOutput>;
}

/// Remote (or in-process) tool provider boundary
///
/// `Err` is reserved for connectivity/protocol failures; domain failures come
/// back as `Ok` with [`ToolOutput::is_error`] set.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Capability listing
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke one tool
    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput>;
}

/// In-process tool provider over registered [`Tool`]s
#[derive(Default)]
pub struct LocalToolProvider {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl LocalToolProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name;
        if let Some(&pos) = self.index.get(&name) {
            self.tools[pos] = tool;
        } else {
            self.index.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&pos| Arc::clone(&self.tools[pos]))
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.descriptor().name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolProvider for LocalToolProvider {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.tools.iter().map(|t| t.descriptor()).collect())
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput> {
        let Some(tool) = self.get(name) else {
            return Ok(ToolOutput::error(format!("Unknown tool: {name}")));
        };

        let args = match tool.descriptor().validate(arguments) {
            Ok(args) => args,
            Err(e) => return Ok(ToolOutput::error(e.to_string())),
        };

        match tool.execute(&args).await {
            Ok(output) => Ok(output),
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool execution failed");
                Ok(ToolOutput::error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamType;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new(
                "echo",
                "Echo the given text",
                vec![ParameterSchema::new("text", ParamType::String, "Text to echo").required()],
            )
        }

        async fn execute(&self, args: &ValidatedArgs) -> Result<ToolOutput> {
            Ok(ToolOutput::text(args.get_str("text").unwrap_or_default()))
        }
    }

    #[test]
    fn test_input_schema_round_trip() {
        let descriptor = EchoTool.descriptor();
        let schema = descriptor.input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["text"]));

        let parsed = ToolDescriptor::from_input_schema("echo", "Echo the given text", schema).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_listed_schema_is_kept_verbatim() {
        let schema = json!({
            "type": "object",
            "properties": {
                "ids": {
                    "type": "array",
                    "description": "Paper ids",
                    "items": {"type": "string", "format": "uri"}
                },
                "filters": {
                    "type": "object",
                    "properties": {"venue": {"type": "string"}},
                    "additionalProperties": false
                }
            },
            "required": ["ids"]
        });

        let descriptor = ToolDescriptor::from_input_schema("fetch", "Fetch papers", &schema).unwrap();

        assert_eq!(descriptor.input_schema(), &schema);
        assert_eq!(descriptor.input_schema()["properties"]["ids"]["items"]["format"], "uri");
        assert_eq!(descriptor.parameters().len(), 2);
        assert!(descriptor.validate(&json!({"ids": ["a"]})).is_ok());
        assert!(descriptor.validate(&json!({"ids": "a"})).is_err());
    }

    #[test]
    fn test_input_schema_rejects_bad_properties() {
        let err = ToolDescriptor::from_input_schema("bad", "", &json!({"properties": [1, 2]}));
        assert!(matches!(err, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_tool_result_accessors() {
        let ok = ToolResult::success("echo", "hi", json!("hi"));
        assert!(ok.is_success());
        assert_eq!(ok.text(), "hi");

        let failed = ToolResult::failure("echo", FailureKind::UnknownTool, "Unknown tool: echo");
        assert_eq!(failed.failure_kind(), Some(FailureKind::UnknownTool));
        assert_eq!(failed.text(), "Unknown tool: echo");
    }

    #[tokio::test]
    async fn test_local_provider() {
        let mut provider = LocalToolProvider::new();
        provider.register(EchoTool);

        assert_eq!(provider.len(), 1);
        assert_eq!(provider.names(), vec!["echo".to_string()]);

        let output = provider.call_tool("echo", &json!({"text": "hi"})).await.unwrap();
        assert_eq!(output, ToolOutput::text("hi"));

        let output = provider.call_tool("echo", &json!({})).await.unwrap();
        assert!(output.is_error);

        let output = provider.call_tool("missing", &json!({})).await.unwrap();
        assert!(output.is_error);
        assert_eq!(output.text, "Unknown tool: missing");
    }
}
