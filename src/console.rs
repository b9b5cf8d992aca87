//! Line-oriented console front end
//!
//! Plays the presentation layer and the document picker: reads commands
//! from stdin and prints whatever the orchestrator publishes.

use crate::conversation::Turn;
use crate::document::Document;
use crate::orchestrator::{CommandError, OrchestratorHandle, View};
use crate::state_machine::{SessionState, TransitionError};
use crate::transport::{DocumentService, SessionId};
use std::collections::HashSet;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

const HELP: &str = "\
Commands:
  /upload <path>   process a PDF and start chatting with it
  /new             close the current document
  /health          check the document service
  /help            show this message
  /quit            exit
Anything else is sent as a question about the current document.";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Upload(&'a str),
    NewDocument,
    Health,
    Help,
    Quit,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse(line: &str) -> Input<'_> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Message(line);
    };

    let (command, arg) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(command, arg)| (command, arg.trim()));

    match command {
        "upload" => Input::Upload(arg),
        "new" => Input::NewDocument,
        "health" => Input::Health,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Unknown(other),
    }
}

fn report(result: Result<(), CommandError>) {
    match result {
        // Blank input is simply not sent
        Ok(()) | Err(CommandError::Rejected(TransitionError::EmptyMessage)) => {}
        Err(e) => println!("{e}"),
    }
}

/// Read commands until EOF or `/quit`
pub async fn run<S>(handle: &OrchestratorHandle, transport: &S) -> std::io::Result<()>
where
    S: DocumentService + ?Sized,
{
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse(&line) {
            Input::Upload("") => println!("Usage: /upload <path to pdf>"),
            Input::Upload(path) => match Document::from_path(Path::new(path)).await {
                Ok(document) => report(handle.start_upload(document).await),
                Err(e) => println!("{e}"),
            },
            Input::NewDocument => report(handle.new_document().await),
            Input::Health => match transport.health_check().await {
                Ok(health) => println!(
                    "Service is {} ({} active sessions)",
                    health.status, health.active_sessions
                ),
                Err(e) => println!("Health check failed: {e}"),
            },
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
            Input::Unknown(command) => {
                println!("Unknown command /{command}. Type /help for commands.");
            }
            Input::Message(text) => report(handle.send_message(text).await),
        }

        // Input is disabled while a document is processed or an answer is pending
        if handle.wait_for(|view| !view.state.is_busy()).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Turns successive views into console lines
#[derive(Default)]
struct Renderer {
    last_state: Option<&'static str>,
    last_error: Option<String>,
    last_session: Option<SessionId>,
    printed_turns: HashSet<String>,
}

impl Renderer {
    fn render(&mut self, view: &View) -> Vec<String> {
        let mut lines = Vec::new();
        let state_changed = self.last_state != Some(view.state.name());

        if view.last_error != self.last_error {
            if let Some(error) = &view.last_error {
                lines.push(format!("Error: {error}"));
            }
            self.last_error.clone_from(&view.last_error);
        }

        if state_changed {
            match &view.state {
                SessionState::NoSession if self.last_state.is_some() => {
                    lines.push("No document loaded. Use /upload <path> to start.".to_string());
                }
                SessionState::Uploading { filename } => {
                    lines.push(format!(
                        "Processing {filename}... This may take a few moments."
                    ));
                }
                _ => {}
            }
        }

        // Once per session, even when the uploading view was never observed
        let session_id = view.session.as_ref().map(|session| &session.session_id);
        if session_id != self.last_session.as_ref() {
            if let Some(session) = &view.session {
                lines.push(format!(
                    "Ready: {} ({} chunks processed)",
                    session.filename, session.chunks_processed
                ));
            }
            self.last_session = session_id.cloned();
        }

        if view.conversation_log.is_empty() {
            self.printed_turns.clear();
        }
        for turn in &view.conversation_log {
            if self.printed_turns.insert(turn.id.clone()) {
                lines.push(format_turn(turn));
            }
        }

        if state_changed && matches!(view.state, SessionState::AwaitingReply { .. }) {
            lines.push("Thinking...".to_string());
        }

        self.last_state = Some(view.state.name());
        lines
    }
}

fn format_turn(turn: &Turn) -> String {
    format!(
        "[{}] {}: {}",
        turn.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
        turn.role.label(),
        turn.content
    )
}

/// Print every published view until the orchestrator stops
pub async fn render_views(mut views: watch::Receiver<View>) {
    let mut renderer = Renderer::default();
    loop {
        let view = views.borrow_and_update().clone();
        for line in renderer.render(&view) {
            println!("{line}");
        }
        if views.changed().await.is_err() {
            break;
        }
    }
}
