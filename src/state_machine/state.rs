//! Session state types

use crate::conversation::{APOLOGY, GREETING};
use crate::transport::{SessionId, UploadResponse};
use serde::Serialize;

/// A processed document on the remote service. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: SessionId,
    pub filename: String,
    pub chunks_processed: u64,
}

impl From<UploadResponse> for Session {
    fn from(response: UploadResponse) -> Self {
        Self {
            session_id: response.session_id,
            filename: response.filename,
            chunks_processed: response.chunks_processed,
        }
    }
}

/// Session lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// No document loaded; ready to accept an upload
    #[default]
    NoSession,

    /// Document sent, waiting for the service to process it
    Uploading { filename: String },

    /// Session ready for questions
    Active { session: Session },

    /// One chat request in flight for this session
    AwaitingReply { session: Session },

    /// Delete requested; local state is being cleared
    Terminating { session: Session },
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active { session }
            | SessionState::AwaitingReply { session }
            | SessionState::Terminating { session } => Some(session),
            SessionState::NoSession | SessionState::Uploading { .. } => None,
        }
    }

    /// Whether a chat message would be accepted right now
    pub fn accepts_input(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    /// Whether a network operation the user waits on is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Uploading { .. } | SessionState::AwaitingReply { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::NoSession => "no_session",
            SessionState::Uploading { .. } => "uploading",
            SessionState::Active { .. } => "active",
            SessionState::AwaitingReply { .. } => "awaiting_reply",
            SessionState::Terminating { .. } => "terminating",
        }
    }
}

/// Fixed texts the machine writes into the conversation (immutable
/// configuration)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub greeting: String,
    pub apology: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            greeting: GREETING.to_string(),
            apology: APOLOGY.to_string(),
        }
    }
}
