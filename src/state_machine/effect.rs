//! Effects produced by state transitions

use crate::conversation::Role;
use crate::document::Document;
use crate::transport::{ChatRequest, SessionId};

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the document to the service (completion arrives as an event)
    RequestUpload { document: Document },

    /// Ask the service a question (completion arrives as an event)
    RequestChat { request: ChatRequest },

    /// Release the session on the service. Fire and forget: the result is
    /// logged and dropped, never fed back into the machine.
    DeleteSession { session_id: SessionId },

    /// Replace the conversation with the greeting turn
    ResetLog { greeting: String },

    /// Drop the conversation entirely
    ClearLog,

    AppendTurn { role: Role, content: String },

    /// Fill the user-visible error slot
    SetError { message: String },

    ClearError,
}

impl Effect {
    pub fn user_turn(content: impl Into<String>) -> Self {
        Effect::AppendTurn {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant_turn(content: impl Into<String>) -> Self {
        Effect::AppendTurn {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn request_chat(session_id: SessionId, message: impl Into<String>) -> Self {
        Effect::RequestChat {
            request: ChatRequest::new(session_id, message),
        }
    }
}
