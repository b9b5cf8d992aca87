//! Orchestrator event loop

use super::{Command, View};
use crate::conversation::ConversationLog;
use crate::document::Document;
use crate::state_machine::{transition, Effect, Event, SessionContext, SessionState, TransitionError};
use crate::transport::{ChatRequest, DocumentService, SessionId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

const COMPLETION_BUFFER: usize = 32;

/// Single owner of session state. Network calls run in spawned tasks and
/// report back as events, so state is only ever mutated inside `run`.
pub struct Orchestrator<T>
where
    T: DocumentService + 'static,
{
    context: SessionContext,
    state: SessionState,
    log: ConversationLog,
    last_error: Option<String>,
    transport: Arc<T>,
    command_rx: mpsc::Receiver<Command>,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    view_tx: watch::Sender<View>,
}

impl<T> Orchestrator<T>
where
    T: DocumentService + 'static,
{
    pub fn new(
        context: SessionContext,
        transport: Arc<T>,
        command_rx: mpsc::Receiver<Command>,
        view_tx: watch::Sender<View>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(COMPLETION_BUFFER);
        Self {
            context,
            state: SessionState::default(),
            log: ConversationLog::new(),
            last_error: None,
            transport,
            command_rx,
            event_tx,
            event_rx,
            view_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting session orchestrator");
        self.publish();

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                }
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::debug!(error = %e, state = self.state.name(), "Discarded transport completion");
                    }
                }
            }
        }

        // In-flight completions are dropped with the receiver
        tracing::info!(state = self.state.name(), "Session orchestrator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let (event, ack) = match command {
            Command::StartUpload { document, ack } => (Event::StartUpload { document }, ack),
            Command::SendMessage { text, ack } => (Event::SendMessage { text }, ack),
            Command::NewDocument { ack } => (Event::NewDocument, ack),
        };

        let result = self.process_event(event);
        if let Err(e) = &result {
            tracing::debug!(error = %e, state = self.state.name(), "Command rejected");
        }
        // The caller may have given up waiting
        let _ = ack.send(result);
    }

    /// Apply an event and any events its effects generate, then publish.
    /// A refused event leaves everything untouched.
    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let mut follow_ups = self.apply(event)?;

        while let Some(event) = follow_ups.pop() {
            match self.apply(event) {
                Ok(more) => follow_ups.extend(more),
                Err(e) => tracing::error!(error = %e, "Follow-up event rejected"),
            }
        }

        self.publish();
        Ok(())
    }

    fn apply(&mut self, event: Event) -> Result<Vec<Event>, TransitionError> {
        let event_name = event.name();
        let result = transition(&self.state, &self.context, event)?;

        tracing::debug!(
            event = event_name,
            from = self.state.name(),
            to = result.new_state.name(),
            "Session transition"
        );
        self.state = result.new_state;

        Ok(result
            .effects
            .into_iter()
            .filter_map(|effect| self.execute_effect(effect))
            .collect())
    }

    fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::RequestUpload { document } => {
                self.spawn_upload(document);
                None
            }
            Effect::RequestChat { request } => {
                self.spawn_chat(request);
                None
            }
            Effect::DeleteSession { session_id } => {
                self.spawn_delete(session_id);
                Some(Event::DeleteDispatched)
            }
            Effect::ResetLog { greeting } => {
                self.log.reset_with_greeting(&greeting);
                None
            }
            Effect::ClearLog => {
                tracing::debug!(turns = self.log.len(), "Discarding conversation");
                self.log.clear();
                None
            }
            Effect::AppendTurn { role, content } => {
                self.log.append(role, content);
                None
            }
            Effect::SetError { message } => {
                self.last_error = Some(message);
                None
            }
            Effect::ClearError => {
                self.last_error = None;
                None
            }
        }
    }

    fn spawn_upload(&self, document: Document) {
        let transport = Arc::clone(&self.transport);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let event = match transport.upload(&document).await {
                Ok(response) => Event::UploadSucceeded {
                    session: response.into(),
                },
                Err(e) => {
                    tracing::warn!(filename = %document.filename(), error = %e, "Upload failed");
                    Event::UploadFailed { message: e.message }
                }
            };
            let _ = event_tx.send(event).await;
        });
    }

    fn spawn_chat(&self, request: ChatRequest) {
        let transport = Arc::clone(&self.transport);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let event = match transport.chat(&request).await {
                Ok(response) => {
                    if response.session_id != request.session_id {
                        tracing::warn!(
                            expected = %request.session_id,
                            received = %response.session_id,
                            "Chat response names a different session"
                        );
                    }
                    Event::ReplySucceeded {
                        session_id: request.session_id,
                        response: response.response,
                    }
                }
                Err(e) => {
                    // The user only sees the fixed apology turn
                    tracing::warn!(session_id = %request.session_id, kind = e.kind.as_str(), error = %e, "Chat request failed");
                    Event::ReplyFailed {
                        session_id: request.session_id,
                        message: e.message,
                    }
                }
            };
            let _ = event_tx.send(event).await;
        });
    }

    /// Fire and forget. Failures are only logged and local teardown never
    /// waits on the result.
    fn spawn_delete(&self, session_id: SessionId) {
        let transport = Arc::clone(&self.transport);

        tokio::spawn(async move {
            if let Err(e) = transport.delete_session(&session_id).await {
                tracing::warn!(session_id = %session_id, error = %e, "Failed to delete session");
            }
        });
    }

    fn view(&self) -> View {
        View {
            state: self.state.clone(),
            session: self.state.session().cloned(),
            conversation_log: self.log.turns().to_vec(),
            last_error: self.last_error.clone(),
            accepts_input: self.state.accepts_input(),
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.view());
    }
}
