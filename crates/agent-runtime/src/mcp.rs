//! Tool-provider client over MCP streamable HTTP.
//!
//! `connect` runs the handshake through rmcp (`initialize`, then
//! `notifications/initialized`); the transport tracks the `Mcp-Session-Id`
//! and reads JSON or SSE replies. After that the connection serves
//! `tools/list` and `tools/call` until [`McpClient::close`] ends the session.

use agent_core::{AgentError, Result, ToolDescriptor, ToolOutput, ToolProvider};
use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParams, ClientCapabilities, Implementation, InitializeRequestParams,
    ProtocolVersion,
};
use rmcp::service::{Peer, RoleClient, RunningService, serve_client};
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ToolServerConfig;
use crate::convert::{descriptor_from_tool, output_from_result, service_error};

type ClientService = RunningService<RoleClient, InitializeRequestParams>;

/// Connected tool-provider client
pub struct McpClient {
    peer: Peer<RoleClient>,
    service: Mutex<Option<ClientService>>,
    config: ToolServerConfig,
}

fn init_params() -> InitializeRequestParams {
    let mut client_info = Implementation::from_build_env();
    client_info.name = env!("CARGO_PKG_NAME").into();
    client_info.version = env!("CARGO_PKG_VERSION").into();

    InitializeRequestParams {
        meta: None,
        protocol_version: ProtocolVersion::V_2025_03_26,
        capabilities: ClientCapabilities::default(),
        client_info,
    }
}

impl McpClient {
    /// Connect and run the initialize handshake
    pub async fn connect(config: ToolServerConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;
        let transport = StreamableHttpClientTransport::with_client(
            http_client,
            StreamableHttpClientTransportConfig::with_uri(config.url.clone()),
        );

        let service = tokio::time::timeout(config.timeout(), serve_client(init_params(), transport))
            .await
            .map_err(|_| AgentError::tool_transport(format!("handshake with {} timed out", config.url)))?
            .map_err(|e| AgentError::tool_transport(format!("handshake with {}: {e}", config.url)))?;

        if let Some(info) = service.peer_info() {
            tracing::info!(
                url = %config.url,
                server = %info.server_info.name,
                protocol = ?info.protocol_version,
                "Connected to tool server"
            );
        }

        Ok(Self {
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
            config,
        })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// End the session
    ///
    /// Stops the transport, which sends `DELETE` for the session. Later calls
    /// fail with a transport error. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        let Some(service) = self.service.lock().await.take() else {
            return Ok(());
        };

        let reason = service
            .cancel()
            .await
            .map_err(|e| AgentError::tool_transport(format!("closing session: {e}")))?;
        tracing::info!(url = %self.config.url, reason = ?reason, "Tool server session closed");
        Ok(())
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let tools = tokio::time::timeout(self.config.timeout(), self.peer.list_all_tools())
            .await
            .map_err(|_| AgentError::tool_transport("tools/list timed out"))?
            .map_err(service_error)?;

        tools.iter().map(descriptor_from_tool).collect()
    }

    async fn call_tool(&self, name: &str, arguments: &Value) -> Result<ToolOutput> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_string().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };
        tracing::debug!(tool = %name, "tools/call");

        let result = tokio::time::timeout(self.config.timeout(), self.peer.call_tool(params))
            .await
            .map_err(|_| AgentError::tool_transport(format!("tools/call {name} timed out")))?
            .map_err(service_error)?;

        Ok(output_from_result(result))
    }
}
