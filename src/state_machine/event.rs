//! Events that drive the session lifecycle

use crate::document::Document;
use crate::state_machine::state::Session;
use crate::transport::SessionId;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    StartUpload {
        document: Document,
    },
    SendMessage {
        text: String,
    },
    NewDocument,

    // Transport completions
    UploadSucceeded {
        session: Session,
    },
    UploadFailed {
        message: String,
    },
    ReplySucceeded {
        session_id: SessionId,
        response: String,
    },
    ReplyFailed {
        session_id: SessionId,
        message: String,
    },

    /// Delete request handed off; its outcome is never reported back
    DeleteDispatched,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::StartUpload { .. } => "start_upload",
            Event::SendMessage { .. } => "send_message",
            Event::NewDocument => "new_document",
            Event::UploadSucceeded { .. } => "upload_succeeded",
            Event::UploadFailed { .. } => "upload_failed",
            Event::ReplySucceeded { .. } => "reply_succeeded",
            Event::ReplyFailed { .. } => "reply_failed",
            Event::DeleteDispatched => "delete_dispatched",
        }
    }
}
