//! HTTP Handlers

use std::future::Future;
use std::sync::Arc;

use axum::{Json, extract::State};
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use serde::Serialize;
use serde_json::{Map, Value};

use agent_core::{LocalToolProvider, ToolProvider};
use agent_runtime::convert::{result_from_output, tool_from_descriptor};

use crate::state::AppState;

const SERVER_NAME: &str = "google-scholar-server";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tools: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        tools: state.tools.names(),
    })
}

/// MCP handler serving the registered tools, one instance per session
#[derive(Clone)]
pub struct ScholarToolServer {
    tools: Arc<LocalToolProvider>,
}

impl ScholarToolServer {
    pub fn new(tools: Arc<LocalToolProvider>) -> Self {
        Self { tools }
    }
}

impl ServerHandler for ScholarToolServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.into();
        server_info.version = env!("CARGO_PKG_VERSION").into();

        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info,
            instructions: Some("Search academic papers on Google Scholar.".into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            let tools = self
                .tools
                .list_tools()
                .await
                .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

            Ok(ListToolsResult::with_all_items(
                tools.iter().map(tool_from_descriptor).collect(),
            ))
        }
    }

    /// Unknown tools and bad arguments come back as `isError` results
    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let name = request.name.as_ref();
            let arguments = Value::Object(request.arguments.clone().unwrap_or_else(Map::new));
            tracing::info!(tool = %name, args = %arguments, "Calling tool");

            let output = self
                .tools
                .call_tool(name, &arguments)
                .await
                .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
            if output.is_error {
                tracing::warn!(tool = %name, message = %output.text, "Tool returned an error");
            }

            Ok(result_from_output(output))
        }
    }
}
