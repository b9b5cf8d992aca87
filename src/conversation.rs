//! Conversation log for the active session

use chrono::{DateTime, Utc};
use serde::Serialize;

/// First turn of every fresh session. Synthesized locally, never fetched.
pub const GREETING: &str = "Hello! I've processed your document and I'm ready to answer questions about it. What would you like to know?";

/// Assistant turn substituted for a failed chat request
pub const APOLOGY: &str =
    "I apologize, but I encountered an error while processing your question. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    /// Display key only; unique within the process
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only sequence of turns. Only ever reset or cleared as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over with just the assistant greeting
    pub fn reset_with_greeting(&mut self, greeting: &str) {
        self.turns.clear();
        self.turns.push(Turn::new(Role::Assistant, greeting));
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Turn {
        self.turns.push(Turn::new(role, content));
        &self.turns[self.turns.len() - 1]
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}
