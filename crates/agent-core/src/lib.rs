//! # agent-core
//!
//! Multi-turn tool-use orchestration with a provider-agnostic model
//! abstraction and a remote tool catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Session                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │ Conversation │◄──│    Agent     │──►│  ModelProvider   │  │
//! │  │  (turns)     │   │ (reasoning)  │   │    (Strategy)    │  │
//! │  └──────────────┘   └──────┬───────┘   └──────────────────┘  │
//! │                     ┌──────▼───────┐   ┌──────────────────┐  │
//! │                     │ ToolInvoker  │──►│  ToolProvider    │  │
//! │                     │ + Registry   │   │ (remote / local) │  │
//! │                     └──────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only transport failures and malformed model replies escape a round; every
//! tool-level failure is handed back to the model as data.

pub mod error;
pub mod invoker;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod registry;
pub mod schema;
pub mod session;
pub mod tool;

pub use error::{AgentError, Boundary, Result};
pub use invoker::ToolInvoker;
pub use message::{Conversation, Role, Turn, TurnContent};
pub use provider::{GenerationOptions, ModelProvider, ModelReply};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use registry::ToolRegistry;
pub use schema::{ArgValue, ParamType, ParameterSchema, ValidatedArgs};
pub use session::{Session, SessionId};
pub use tool::{
    FailureKind, LocalToolProvider, Tool, ToolCallRequest, ToolDescriptor, ToolOutcome,
    ToolOutput, ToolProvider, ToolResult,
};
