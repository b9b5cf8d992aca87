//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::conversation::Role;
use crate::document::Document;
use crate::transport::SessionId;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::default()
}

fn pdf(name: &str) -> Document {
    Document::new(format!("{name}.pdf"), b"%PDF-1.7".to_vec()).unwrap()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_session_id() -> impl Strategy<Value = SessionId> {
    prop_oneof![Just("s1"), Just("s2"), Just("s3")].prop_map(SessionId::new)
}

fn arb_session() -> impl Strategy<Value = Session> {
    (arb_session_id(), "[a-z]{1,8}", 0u64..500).prop_map(|(session_id, name, chunks)| Session {
        session_id,
        filename: format!("{name}.pdf"),
        chunks_processed: chunks,
    })
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::NoSession),
        "[a-z]{1,8}".prop_map(|name| SessionState::Uploading {
            filename: format!("{name}.pdf")
        }),
        arb_session().prop_map(|session| SessionState::Active { session }),
        arb_session().prop_map(|session| SessionState::AwaitingReply { session }),
        arb_session().prop_map(|session| SessionState::Terminating { session }),
    ]
}

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|name| Event::StartUpload {
            document: pdf(&name)
        }),
        "[a-zA-Z ?]{0,20}".prop_map(|text| Event::SendMessage { text }),
        arb_blank_text().prop_map(|text| Event::SendMessage { text }),
        Just(Event::NewDocument),
        arb_session().prop_map(|session| Event::UploadSucceeded { session }),
        "[a-z ]{1,20}".prop_map(|message| Event::UploadFailed { message }),
        (arb_session_id(), "[a-z ]{1,20}").prop_map(|(session_id, response)| {
            Event::ReplySucceeded {
                session_id,
                response,
            }
        }),
        (arb_session_id(), "[a-z ]{1,20}")
            .prop_map(|(session_id, message)| Event::ReplyFailed { session_id, message }),
        Just(Event::DeleteDispatched),
    ]
}

fn count_chat_requests(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::RequestChat { .. }))
        .count()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Blank messages are refused in every state and never touch the log or
    /// the network
    #[test]
    fn prop_blank_message_never_produces_effects(state in arb_state(), text in arb_blank_text()) {
        let result = transition(&state, &test_context(), Event::SendMessage { text });
        prop_assert!(result.is_err());
    }

    /// While a reply is pending every further send is refused
    #[test]
    fn prop_send_while_awaiting_is_refused(session in arb_session(), text in ".{0,40}") {
        let state = SessionState::AwaitingReply { session };
        let result = transition(&state, &test_context(), Event::SendMessage { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::ReplyPending);
    }

    /// A successful upload lands in Active with exactly one log reset
    #[test]
    fn prop_upload_success_resets_log(filename in "[a-z]{1,8}", session in arb_session()) {
        let state = SessionState::Uploading { filename };
        let result = transition(&state, &test_context(), Event::UploadSucceeded { session: session.clone() }).unwrap();
        prop_assert_eq!(result.new_state, SessionState::Active { session });
        prop_assert_eq!(result.effects.len(), 1);
        let is_reset = matches!(result.effects[0], Effect::ResetLog { .. });
        prop_assert!(is_reset);
    }

    /// A failed upload never leaves a session behind
    #[test]
    fn prop_upload_failure_has_no_session(filename in "[a-z]{1,8}", message in "[a-z ]{0,20}") {
        let state = SessionState::Uploading { filename };
        let result = transition(&state, &test_context(), Event::UploadFailed { message }).unwrap();
        prop_assert_eq!(&result.new_state, &SessionState::NoSession);
        prop_assert!(result.new_state.session().is_none());
        let sets_error = result.effects.iter().any(|e| matches!(e, Effect::SetError { .. }));
        prop_assert!(sets_error);
    }

    /// A failed reply for the current session always appends exactly one
    /// apology and returns to Active
    #[test]
    fn prop_reply_failure_recovers(session in arb_session(), message in "[a-z ]{0,20}") {
        let ctx = test_context();
        let state = SessionState::AwaitingReply { session: session.clone() };
        let result = transition(&state, &ctx, Event::ReplyFailed {
            session_id: session.session_id.clone(),
            message,
        }).unwrap();
        prop_assert_eq!(result.new_state, SessionState::Active { session });
        prop_assert_eq!(result.effects, vec![Effect::AppendTurn {
            role: Role::Assistant,
            content: ctx.apology,
        }]);
    }

    /// Only uploads and teardown touch the error slot; chat failures never do
    #[test]
    fn prop_error_slot_only_touched_by_upload(state in arb_state(), event in arb_event()) {
        let is_upload_event = matches!(event, Event::StartUpload { .. } | Event::UploadFailed { .. } | Event::NewDocument);
        if let Ok(result) = transition(&state, &test_context(), event) {
            let touches_error = result.effects.iter().any(|e| matches!(e, Effect::SetError { .. } | Effect::ClearError));
            prop_assert!(!touches_error || is_upload_event);
        }
    }

    /// Over any event sequence at most one chat request is outstanding, and
    /// the state never holds a session while uploading
    #[test]
    fn prop_at_most_one_chat_in_flight(events in proptest::collection::vec(arb_event(), 1..40)) {
        let ctx = test_context();
        let mut state = SessionState::NoSession;
        let mut in_flight = 0usize;

        for event in events {
            let resolves_chat = matches!(event, Event::ReplySucceeded { .. } | Event::ReplyFailed { .. });
            let starts_teardown = matches!(event, Event::NewDocument);
            let Ok(result) = transition(&state, &ctx, event) else {
                continue;
            };

            if resolves_chat || (starts_teardown && matches!(state, SessionState::AwaitingReply { .. })) {
                // Abandoned replies are refused as stale when they arrive
                in_flight = in_flight.saturating_sub(1);
            }
            in_flight += count_chat_requests(&result.effects);
            prop_assert!(in_flight <= 1, "{} chats in flight", in_flight);

            if matches!(result.new_state, SessionState::AwaitingReply { .. }) {
                prop_assert_eq!(in_flight, 1);
            }
            if let SessionState::Uploading { .. } = result.new_state {
                prop_assert!(result.new_state.session().is_none());
            }
            state = result.new_state;
        }
    }

    /// Teardown always passes through Terminating and ends in NoSession
    #[test]
    fn prop_new_document_reaches_no_session(session in arb_session(), awaiting in any::<bool>()) {
        let ctx = test_context();
        let state = if awaiting {
            SessionState::AwaitingReply { session: session.clone() }
        } else {
            SessionState::Active { session: session.clone() }
        };
        let result = transition(&state, &ctx, Event::NewDocument).unwrap();
        prop_assert_eq!(&result.new_state, &SessionState::Terminating { session: session.clone() });
        prop_assert_eq!(&result.effects[0], &Effect::DeleteSession { session_id: session.session_id });
        let next = transition(&result.new_state, &ctx, Event::DeleteDispatched).unwrap();
        prop_assert_eq!(next.new_state, SessionState::NoSession);
    }
}
