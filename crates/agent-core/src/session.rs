//! Session Management
//!
//! A session owns one conversation and exposes the caller-facing surface:
//! advance, reset, and history inspection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::message::{Conversation, Turn};
use crate::reasoning::Agent;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A conversation with one agent
///
/// `&mut self` on [`Session::advance_conversation`] guarantees a round
/// finishes before the next message is accepted.
pub struct Session {
    id: SessionId,
    agent: Arc<Agent>,
    conversation: Conversation,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new(agent: Arc<Agent>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            agent,
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Run one round and return the text to show the user
    pub async fn advance_conversation(&mut self, text: &str) -> Result<String> {
        let result = self.agent.advance(&mut self.conversation, text).await;
        self.touch();
        result
    }

    /// Clear the conversation
    pub fn reset(&mut self) {
        tracing::debug!(session = %self.id, turns = self.conversation.len(), "Resetting session");
        self.conversation.clear();
        self.touch();
    }

    /// Ordered transcript, for diagnostics
    pub fn inspect_history(&self) -> &[Turn] {
        self.conversation.turns()
    }

    /// Turn count
    pub fn turn_count(&self) -> usize {
        self.conversation.len()
    }

    /// Time from creation to the last round or reset
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }
}
