//! Application State

use std::sync::Arc;

use agent_core::LocalToolProvider;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tools served over MCP and listed by `/health`
    pub tools: Arc<LocalToolProvider>,
}

impl AppState {
    pub fn new(tools: LocalToolProvider) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }
}
