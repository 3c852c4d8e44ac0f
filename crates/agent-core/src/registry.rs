//! Tool Registry
//!
//! Read-only catalog of the tools a provider exposes. Built once at startup;
//! the model's requests are resolved against the exact catalog it was shown.

use std::collections::HashMap;

use crate::error::{AgentError, Result};
use crate::tool::{ToolDescriptor, ToolProvider};

/// Registry for available tools
#[derive(Clone, Debug, Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build from descriptors, keeping their order
    pub fn from_descriptors(descriptors: Vec<ToolDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (pos, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.name.clone(), pos).is_some() {
                return Err(AgentError::Config(format!(
                    "duplicate tool name: {}",
                    descriptor.name
                )));
            }
        }

        Ok(Self { descriptors, index })
    }

    /// Populate from the provider's capability listing
    pub async fn discover(provider: &dyn ToolProvider) -> Result<Self> {
        let descriptors = provider.list_tools().await?;
        tracing::info!(count = descriptors.len(), "Discovered tools");
        Self::from_descriptors(descriptors)
    }

    /// All descriptors in stable order
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Look up one descriptor
    pub fn describe(&self, name: &str) -> Result<&ToolDescriptor> {
        self.index
            .get(name)
            .map(|&pos| &self.descriptors[pos])
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
