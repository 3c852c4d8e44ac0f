//! # agent-runtime
//!
//! Concrete collaborators for `agent-core`.
//!
//! ## Providers
//!
//! - **Gemini**: `generateContent` with native function calling
//! - **McpClient**: remote tool catalog over MCP streamable HTTP (rmcp)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{GeminiProvider, McpClient, ToolServerConfig};
//!
//! let tools = Arc::new(McpClient::connect(ToolServerConfig::from_env()).await?);
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(GeminiProvider::from_env()?))
//!     .invoker(ToolInvoker::connect(tools).await?)
//!     .build()?;
//! ```

pub mod config;
pub mod convert;
pub mod gemini;
pub mod mcp;

pub use config::{GeminiConfig, ToolServerConfig};
pub use gemini::GeminiProvider;
pub use mcp::McpClient;

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentBuilder, AgentError, ModelProvider, Result, Role, Session, Tool, ToolInvoker,
    ToolProvider, ToolRegistry,
};
