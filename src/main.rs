//! ragbox - chat with a PDF through a remote document service
//!
//! Uploads one document at a time, keeps the conversation about it, and
//! releases the remote session when the user moves on.

mod config;
mod console;
mod conversation;
mod document;
mod orchestrator;
mod state_machine;
mod transport;

use config::ClientConfig;
use state_machine::SessionContext;
use std::sync::Arc;
use transport::{DocumentService, HttpTransport, LoggingTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they stay out of the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragbox=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_secs = config.timeout.as_secs(),
        "Using document service"
    );

    let transport = Arc::new(LoggingTransport::new(Arc::new(HttpTransport::new(
        &config,
    )?)));

    match transport.health_check().await {
        Ok(health) => tracing::info!(
            status = %health.status,
            active_sessions = health.active_sessions,
            "Document service reachable"
        ),
        Err(e) => tracing::warn!(error = %e, "Document service health check failed"),
    }

    let (handle, orchestrator_task) =
        orchestrator::spawn(Arc::clone(&transport), SessionContext::default());
    let renderer = tokio::spawn(console::render_views(handle.subscribe()));

    console::run(&handle, transport.as_ref()).await?;

    tracing::info!(state = handle.view().state.name(), "Console closed");

    // Dropping the last handle stops the orchestrator, which closes the view
    drop(handle);
    orchestrator_task.await?;
    renderer.await?;

    Ok(())
}
