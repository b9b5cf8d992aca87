//! Session orchestrator
//!
//! Owns the single live session and its conversation. User commands and
//! transport completions are applied one at a time on a single task; the
//! front end only ever sees the published [`View`].

mod executor;


pub use executor::Orchestrator;

use crate::conversation::Turn;
use crate::document::Document;
use crate::state_machine::{Session, SessionContext, SessionState, TransitionError};
use crate::transport::DocumentService;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 32;

/// Why a command did not take effect
#[derive(Debug, Error)]
pub enum CommandError {
    /// Refused locally; nothing changed and no request was made
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Orchestrator has stopped")]
    Stopped,
}

type Ack = oneshot::Sender<Result<(), TransitionError>>;

/// Commands accepted from the presentation layer
#[derive(Debug)]
pub enum Command {
    StartUpload { document: Document, ack: Ack },
    SendMessage { text: String, ack: Ack },
    NewDocument { ack: Ack },
}

/// Read-only snapshot for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct View {
    pub state: SessionState,
    pub session: Option<Session>,
    pub conversation_log: Vec<Turn>,
    pub last_error: Option<String>,
    pub accepts_input: bool,
}

/// Handle to interact with a running orchestrator
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<Command>,
    view_rx: watch::Receiver<View>,
}

impl OrchestratorHandle {
    /// Resolves once the upload has started (or was refused), not when the
    /// service has finished processing the document.
    pub async fn start_upload(&self, document: Document) -> Result<(), CommandError> {
        self.dispatch(|ack| Command::StartUpload { document, ack })
            .await
    }

    /// Resolves once the user turn is in the log (or the message was
    /// refused). The answer arrives later through the view.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<(), CommandError> {
        let text = text.into();
        self.dispatch(|ack| Command::SendMessage { text, ack }).await
    }

    /// Local state is cleared before this resolves; the remote delete may
    /// still be running.
    pub async fn new_document(&self) -> Result<(), CommandError> {
        self.dispatch(|ack| Command::NewDocument { ack }).await
    }

    pub fn view(&self) -> View {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view_rx.clone()
    }

    /// Wait for the first published view matching `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&View) -> bool,
    ) -> Result<View, CommandError> {
        let mut rx = self.view_rx.clone();
        let view = rx
            .wait_for(|view| predicate(view))
            .await
            .map_err(|_| CommandError::Stopped)?;
        Ok((*view).clone())
    }

    async fn dispatch(&self, build: impl FnOnce(Ack) -> Command) -> Result<(), CommandError> {
        let (ack, ack_rx) = oneshot::channel();
        self.command_tx
            .send(build(ack))
            .await
            .map_err(|_| CommandError::Stopped)?;
        ack_rx.await.map_err(|_| CommandError::Stopped)??;
        Ok(())
    }
}

/// Start an orchestrator task. It runs until every handle is dropped.
pub fn spawn<T>(transport: Arc<T>, context: SessionContext) -> (OrchestratorHandle, JoinHandle<()>)
where
    T: DocumentService + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (view_tx, view_rx) = watch::channel(View::default());

    let orchestrator = Orchestrator::new(context, transport, command_rx, view_tx);
    let task = tokio::spawn(orchestrator.run());

    (OrchestratorHandle { command_tx, view_rx }, task)
}
