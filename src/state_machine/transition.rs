//! Pure state transition function

use super::{Effect, Event, SessionContext, SessionState};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is refused. A refused event changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Still waiting for the previous answer")]
    ReplyPending,
    #[error("A document is already being processed")]
    UploadInProgress,
    #[error("Close the current document before uploading another")]
    SessionActive,
    #[error("No document loaded")]
    NoSession,
    #[error("Reply for session {0} arrived after it was closed")]
    StaleReply(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs and performs
/// no I/O.
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Upload
        // ============================================================
        (SessionState::NoSession, Event::StartUpload { document }) => {
            Ok(TransitionResult::new(SessionState::Uploading {
                filename: document.filename().to_string(),
            })
            .with_effect(Effect::ClearError)
            .with_effect(Effect::RequestUpload { document }))
        }

        (SessionState::Uploading { .. }, Event::StartUpload { .. }) => {
            Err(TransitionError::UploadInProgress)
        }

        (
            SessionState::Active { .. }
            | SessionState::AwaitingReply { .. }
            | SessionState::Terminating { .. },
            Event::StartUpload { .. },
        ) => Err(TransitionError::SessionActive),

        (SessionState::Uploading { .. }, Event::UploadSucceeded { session }) => Ok(
            TransitionResult::new(SessionState::Active { session }).with_effect(
                Effect::ResetLog {
                    greeting: context.greeting.clone(),
                },
            ),
        ),

        // No partial session survives a failed upload
        (SessionState::Uploading { .. }, Event::UploadFailed { message }) => {
            Ok(
                TransitionResult::new(SessionState::NoSession).with_effect(Effect::SetError {
                    message: format!("Upload failed: {message}"),
                }),
            )
        }

        // ============================================================
        // Chat
        // ============================================================

        // Pending check first: while waiting, every send is refused the same way
        (SessionState::AwaitingReply { .. }, Event::SendMessage { .. }) => {
            Err(TransitionError::ReplyPending)
        }

        (SessionState::Active { session }, Event::SendMessage { text }) => {
            let message = text.trim();
            if message.is_empty() {
                return Err(TransitionError::EmptyMessage);
            }
            // The user turn is appended before the request goes out
            Ok(TransitionResult::new(SessionState::AwaitingReply {
                session: session.clone(),
            })
            .with_effect(Effect::user_turn(message))
            .with_effect(Effect::request_chat(session.session_id.clone(), message)))
        }

        (
            SessionState::NoSession | SessionState::Uploading { .. } | SessionState::Terminating { .. },
            Event::SendMessage { .. } | Event::NewDocument,
        ) => Err(TransitionError::NoSession),

        (
            SessionState::AwaitingReply { session },
            Event::ReplySucceeded {
                session_id,
                response,
            },
        ) if session.session_id == session_id => Ok(TransitionResult::new(SessionState::Active {
            session: session.clone(),
        })
        .with_effect(Effect::assistant_turn(response))),

        // Recoverable: the session stays usable and the error slot is untouched
        (SessionState::AwaitingReply { session }, Event::ReplyFailed { session_id, .. })
            if session.session_id == session_id =>
        {
            Ok(TransitionResult::new(SessionState::Active {
                session: session.clone(),
            })
            .with_effect(Effect::assistant_turn(context.apology.clone())))
        }

        // Replies for a session that was closed while they were in flight
        (_, Event::ReplySucceeded { session_id, .. } | Event::ReplyFailed { session_id, .. }) => {
            Err(TransitionError::StaleReply(session_id.to_string()))
        }

        // ============================================================
        // Teardown
        // ============================================================
        (
            SessionState::Active { session } | SessionState::AwaitingReply { session },
            Event::NewDocument,
        ) => Ok(TransitionResult::new(SessionState::Terminating {
            session: session.clone(),
        })
        .with_effect(Effect::DeleteSession {
            session_id: session.session_id.clone(),
        })
        .with_effect(Effect::ClearLog)
        .with_effect(Effect::ClearError)),

        (SessionState::Terminating { .. }, Event::DeleteDispatched) => {
            Ok(TransitionResult::new(SessionState::NoSession))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} cannot handle {}",
            state.name(),
            event.name()
        ))),
    }
}
