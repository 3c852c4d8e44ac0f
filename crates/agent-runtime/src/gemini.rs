//! Gemini LLM Provider
//!
//! Implementation of `ModelProvider` over the Gemini `generateContent` REST
//! API with native function calling.

use agent_core::{
    error::{AgentError, Result},
    message::{Turn, TurnContent},
    provider::{GenerationOptions, ModelProvider, ModelReply, TokenUsage},
    tool::{ToolCallRequest, ToolDescriptor, ToolOutcome, ToolResult},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::GeminiConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,

    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, parts: Vec<Part>) -> Self {
        Self {
            role: Some(role.into()),
            parts,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,

    /// Set on reasoning summaries, which are not part of the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,

    /// Must be returned unchanged with the function call it came with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FunctionCall {
    name: String,

    #[serde(default)]
    args: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,

    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,

    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,

    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,

    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,

    #[serde(default)]
    candidates_token_count: u32,

    #[serde(default)]
    total_token_count: u32,
}

/// Gemini LLM provider
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create from configuration
    pub fn from_config(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.config.base_url)
    }
}

/// Convert the transcript to Gemini `contents`
///
/// Consecutive tool results are grouped into one `user` content, matching
/// the model turn that requested them.
fn convert_transcript(transcript: &[Turn]) -> Vec<Content> {
    let mut contents: Vec<Content> = Vec::with_capacity(transcript.len());

    for turn in transcript {
        match &turn.content {
            TurnContent::Text { text } => {
                let role = if turn.role == agent_core::Role::User { "user" } else { "model" };
                contents.push(Content::new(role, vec![Part::text(text.clone())]));
            }
            TurnContent::ToolCalls { text, calls } => {
                let mut parts = Vec::with_capacity(calls.len() + 1);
                if !text.is_empty() {
                    parts.push(Part::text(text.clone()));
                }
                parts.extend(calls.iter().map(|call| Part {
                    function_call: Some(FunctionCall {
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                        id: call.id.clone(),
                    }),
                    thought_signature: call.signature.clone(),
                    ..Default::default()
                }));
                contents.push(Content::new("model", parts));
            }
            TurnContent::ToolResult { result } => {
                let part = Part {
                    function_response: Some(function_response(result)),
                    ..Default::default()
                };
                match contents.last_mut() {
                    Some(last)
                        if last.role.as_deref() == Some("user")
                            && last.parts.iter().all(|p| p.function_response.is_some()) =>
                    {
                        last.parts.push(part);
                    }
                    _ => contents.push(Content::new("user", vec![part])),
                }
            }
        }
    }

    contents
}

fn function_response(result: &ToolResult) -> FunctionResponse {
    let response = match &result.outcome {
        ToolOutcome::Success { text, .. } => json!({ "name": result.name, "content": text }),
        ToolOutcome::Failure { message, .. } => json!({ "error": message }),
    };

    FunctionResponse {
        name: result.name.clone(),
        id: result.id.clone(),
        response,
    }
}

/// Adapt a JSON Schema node to Gemini's dialect
///
/// Type names are upper-case (`STRING`, `OBJECT`, ...) and every node needs
/// one: untyped nodes get `OBJECT`, `ARRAY` or `STRING` depending on their
/// shape, and `["string", "null"]` becomes `STRING` with `nullable`.
/// Everything else is passed through.
fn gemini_schema(schema: &Value) -> Value {
    let Value::Object(node) = schema else {
        return schema.clone();
    };

    let mut out = Map::with_capacity(node.len() + 1);
    for (key, value) in node {
        let value = match (key.as_str(), value) {
            ("type", Value::String(t)) => Value::String(t.to_ascii_uppercase()),
            ("type", Value::Array(types)) => {
                if types.iter().any(|t| t == "null") {
                    out.insert("nullable".into(), Value::Bool(true));
                }
                match types.iter().filter_map(Value::as_str).find(|t| *t != "null") {
                    Some(t) => Value::String(t.to_ascii_uppercase()),
                    None => continue,
                }
            }
            ("properties", Value::Object(properties)) => Value::Object(
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), gemini_schema(property)))
                    .collect(),
            ),
            ("items", items) => gemini_schema(items),
            ("anyOf", Value::Array(options)) => Value::Array(options.iter().map(gemini_schema).collect()),
            (_, v) => v.clone(),
        };
        out.insert(key.clone(), value);
    }

    if !out.contains_key("type") && !out.contains_key("anyOf") {
        let fallback = if out.contains_key("properties") {
            "OBJECT"
        } else if out.contains_key("items") {
            "ARRAY"
        } else {
            "STRING"
        };
        out.insert("type".into(), Value::String(fallback.into()));
    }

    Value::Object(out)
}

fn convert_catalog(catalog: &[ToolDescriptor]) -> Vec<ToolSet> {
    if catalog.is_empty() {
        return Vec::new();
    }

    let declarations = catalog
        .iter()
        .map(|tool| FunctionDeclaration {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: (!tool.parameters().is_empty()).then(|| gemini_schema(tool.input_schema())),
        })
        .collect();

    vec![ToolSet {
        function_declarations: declarations,
    }]
}

fn build_request(
    transcript: &[Turn],
    catalog: &[ToolDescriptor],
    options: &GenerationOptions,
) -> GenerateRequest {
    let generation_config = (options.temperature.is_some() || options.max_tokens.is_some()).then(|| {
        GenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
        }
    });

    GenerateRequest {
        contents: convert_transcript(transcript),
        tools: convert_catalog(catalog),
        system_instruction: options.system_prompt.as_ref().map(|prompt| Content {
            role: None,
            parts: vec![Part::text(prompt.clone())],
        }),
        generation_config,
    }
}

/// Convert a Gemini response to a model reply
fn parse_response(response: GenerateResponse, model: &str) -> Result<ModelReply> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "none given".into());
        return Err(AgentError::MalformedReply(format!(
            "no candidates in response (block reason: {reason})"
        )));
    };

    let Some(content) = candidate.content else {
        return Err(AgentError::MalformedReply(format!(
            "candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    };

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in content.parts {
        if let Some(call) = part.function_call {
            let mut request = ToolCallRequest::new(call.name, call.args);
            request.id = call.id;
            request.signature = part.thought_signature;
            tool_calls.push(request);
        } else if let Some(t) = part.text {
            if part.thought != Some(true) {
                text.push_str(&t);
            }
        }
    }

    if tool_calls.iter().any(|c| c.name.is_empty()) {
        return Err(AgentError::MalformedReply("function call without a name".into()));
    }

    Ok(ModelReply {
        text,
        tool_calls,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        usage: response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }),
    })
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(
        &self,
        transcript: &[Turn],
        catalog: &[ToolDescriptor],
        options: &GenerationOptions,
    ) -> Result<ModelReply> {
        let request = build_request(transcript, catalog, options);

        let response = self
            .client
            .post(self.endpoint(&options.model))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::model_transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::model_transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(%status, "Gemini request failed");
            return Err(AgentError::model_transport(format!("HTTP {status}: {}", body.trim())));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::MalformedReply(format!("invalid response body: {e}")))?;

        let reply = parse_response(parsed, &options.model)?;
        tracing::debug!(
            model = %reply.model,
            tool_calls = reply.tool_calls.len(),
            "Gemini reply received"
        );
        Ok(reply)
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models/{}", self.config.base_url, self.config.model);
        match self
            .client
            .get(url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{FailureKind, ParamType, ParameterSchema};

    fn search_descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            "search_google_scholar",
            "Search Google Scholar",
            vec![
                ParameterSchema::new("query", ParamType::String, "Search query").required(),
                ParameterSchema::new("numResults", ParamType::Number, "Result count")
                    .with_range(1.0, 20.0)
                    .with_default(json!(10)),
            ],
        )
    }

    #[test]
    fn test_transcript_conversion() {
        let call = ToolCallRequest::new("search_google_scholar", json!({"query": "attention"}));
        let transcript = vec![
            Turn::user("Find papers"),
            Turn::model_tool_calls("", vec![call.clone(), call]),
            Turn::tool_result(ToolResult::success("search_google_scholar", "[]", json!([]))),
            Turn::tool_result(ToolResult::failure(
                "search_google_scholar",
                FailureKind::Transport,
                "connection refused",
            )),
            Turn::model("Nothing found."),
        ];

        let contents = serde_json::to_value(convert_transcript(&transcript)).unwrap();

        assert_eq!(contents.as_array().unwrap().len(), 4);
        assert_eq!(contents[0], json!({"role": "user", "parts": [{"text": "Find papers"}]}));
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["query"], "attention");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"].as_array().unwrap().len(), 2);
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"],
            json!({"name": "search_google_scholar", "content": "[]"})
        );
        assert_eq!(
            contents[2]["parts"][1]["functionResponse"]["response"],
            json!({"error": "connection refused"})
        );
        assert_eq!(contents[3]["parts"][0]["text"], "Nothing found.");
    }

    #[test]
    fn test_request_body() {
        let options = GenerationOptions {
            system_prompt: Some("Be brief.".into()),
            temperature: Some(0.2),
            ..Default::default()
        };
        let request = build_request(&[Turn::user("hi")], &[search_descriptor()], &options);
        let body = serde_json::to_value(&request).unwrap();

        let declaration = &body["tools"][0]["functionDeclarations"][0];
        assert_eq!(declaration["name"], "search_google_scholar");
        assert_eq!(declaration["parameters"]["type"], "OBJECT");
        assert_eq!(declaration["parameters"]["properties"]["query"]["type"], "STRING");
        assert_eq!(declaration["parameters"]["properties"]["numResults"]["type"], "NUMBER");
        assert_eq!(declaration["parameters"]["required"], json!(["query"]));
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief.");
        assert!(body["systemInstruction"].get("role").is_none());
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_request_without_tools_or_options() {
        let body =
            serde_json::to_value(build_request(&[Turn::user("hi")], &[], &GenerationOptions::default()))
                .unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_parse_function_calls_in_order() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Let me search."},
                        {"functionCall": {"name": "a", "args": {"query": "one"}}},
                        {"functionCall": {"name": "b", "args": {}, "id": "call-2"}}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15}
        }))
        .unwrap();

        let reply = parse_response(response, "gemini-2.5-flash").unwrap();

        assert_eq!(reply.text, "Let me search.");
        let names: Vec<&str> = reply.tool_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(reply.tool_calls[1].id.as_deref(), Some("call-2"));
        assert_eq!(reply.model, "gemini-2.5-flash");
        assert_eq!(reply.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_thought_signature_is_sent_back() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"functionCall": {"name": "search", "args": {"query": "x"}}, "thoughtSignature": "SIG123"}
            ]}}]
        }))
        .unwrap();
        let reply = parse_response(response, "m").unwrap();
        assert_eq!(reply.tool_calls[0].signature.as_deref(), Some("SIG123"));

        let transcript = vec![
            Turn::user("Find x"),
            Turn::model_tool_calls(reply.text, reply.tool_calls),
        ];
        let contents = serde_json::to_value(convert_transcript(&transcript)).unwrap();

        assert_eq!(
            contents[1],
            json!({"role": "model", "parts": [{
                "functionCall": {"name": "search", "args": {"query": "x"}},
                "thoughtSignature": "SIG123"
            }]})
        );
    }

    #[test]
    fn test_listed_schema_reaches_the_model() {
        let schema = json!({
            "type": "object",
            "properties": {
                "ids": {"type": "array", "description": "Paper ids", "items": {"type": "string"}},
                "note": {"description": "Free-form note"},
                "venue": {"type": ["string", "null"]}
            },
            "required": ["ids"]
        });
        let tool = ToolDescriptor::from_input_schema("fetch", "Fetch papers", &schema).unwrap();

        let tools = serde_json::to_value(convert_catalog(&[tool])).unwrap();
        let parameters = &tools[0]["functionDeclarations"][0]["parameters"];

        assert_eq!(parameters["type"], "OBJECT");
        assert_eq!(parameters["required"], json!(["ids"]));
        assert_eq!(parameters["properties"]["ids"]["type"], "ARRAY");
        assert_eq!(parameters["properties"]["ids"]["items"], json!({"type": "STRING"}));
        assert_eq!(parameters["properties"]["note"]["type"], "STRING");
        assert_eq!(parameters["properties"]["venue"], json!({"type": "STRING", "nullable": true}));
    }

    #[test]
    fn test_parse_skips_thoughts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "thinking...", "thought": true},
                {"text": "Hello"},
                {"text": " world"}
            ]}}]
        }))
        .unwrap();

        let reply = parse_response(response, "m").unwrap();
        assert_eq!(reply.text, "Hello world");
        assert!(!reply.has_tool_calls());
    }

    #[test]
    fn test_parse_malformed() {
        let blocked: GenerateResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        let err = parse_response(blocked, "m").unwrap_err();
        assert!(matches!(err, AgentError::MalformedReply(ref m) if m.contains("SAFETY")));

        let empty: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "MAX_TOKENS"}]})).unwrap();
        assert!(matches!(parse_response(empty, "m"), Err(AgentError::MalformedReply(_))));
    }
}
