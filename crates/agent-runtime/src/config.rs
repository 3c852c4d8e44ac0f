//! Environment-driven configuration for the runtime collaborators.

use std::time::Duration;

use agent_core::{AgentError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TOOL_SERVER_URL: &str = "http://localhost:3000/mcp";

/// Gemini provider configuration
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,

    /// Default model identifier
    pub model: String,

    /// API root, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            timeout_secs: 120,
        }
    }

    /// Read `GEMINI_API_KEY`, `GEMINI_MODEL` and `GEMINI_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AgentError::Config("GEMINI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.is_empty()) {
            config.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL").filter(|u| !u.is_empty()) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Remote tool server configuration
#[derive(Clone, Debug)]
pub struct ToolServerConfig {
    /// MCP streamable HTTP endpoint
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TOOL_SERVER_URL.into(),
            timeout_secs: 60,
        }
    }
}

impl ToolServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Read `MCP_SERVER_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup("MCP_SERVER_URL")
            .filter(|u| !u.is_empty())
            .map_or_else(Self::default, Self::new)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let err = GeminiConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_gemini_defaults_and_overrides() {
        let config = GeminiConfig::from_lookup(env(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(120));

        let config = GeminiConfig::from_lookup(env(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_BASE_URL", "http://localhost:8080/v1beta/"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_tool_server_url() {
        assert_eq!(ToolServerConfig::from_lookup(env(&[])).url, DEFAULT_TOOL_SERVER_URL);
        let config = ToolServerConfig::from_lookup(env(&[("MCP_SERVER_URL", "http://tools:9000/mcp")]));
        assert_eq!(config.url, "http://tools:9000/mcp");
        assert_eq!(config.timeout_secs, 60);
    }
}
