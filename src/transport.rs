//! Document service client
//!
//! Four request/response operations against the remote service that
//! ingests documents and answers questions about them.

mod error;
mod http;
mod types;

#[cfg(test)]
pub mod testing;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpTransport;
pub use types::*;

use crate::document::Document;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for the document service
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Upload one document and have it processed into a new session
    async fn upload(&self, document: &Document) -> Result<UploadResponse, TransportError>;

    /// Ask a question within an existing session
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;

    /// Release a session on the service. Callers treat this as best-effort.
    async fn delete_session(&self, session_id: &SessionId) -> Result<(), TransportError>;

    /// Service liveness and number of sessions it currently holds
    async fn health_check(&self) -> Result<HealthResponse, TransportError>;
}

#[async_trait]
impl<T: DocumentService + ?Sized> DocumentService for Arc<T> {
    async fn upload(&self, document: &Document) -> Result<UploadResponse, TransportError> {
        (**self).upload(document).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        (**self).chat(request).await
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), TransportError> {
        (**self).delete_session(session_id).await
    }

    async fn health_check(&self) -> Result<HealthResponse, TransportError> {
        (**self).health_check().await
    }
}

/// Logging wrapper for document services
pub struct LoggingTransport {
    inner: Arc<dyn DocumentService>,
}

impl LoggingTransport {
    pub fn new(inner: Arc<dyn DocumentService>) -> Self {
        Self { inner }
    }
}

fn log_failure(operation: &'static str, started: Instant, e: &TransportError) {
    tracing::error!(
        operation,
        duration_ms = %started.elapsed().as_millis(),
        kind = e.kind.as_str(),
        status = ?e.status,
        error = %e.message,
        "Document service request failed"
    );
}

#[async_trait]
impl DocumentService for LoggingTransport {
    async fn upload(&self, document: &Document) -> Result<UploadResponse, TransportError> {
        let started = Instant::now();
        let result = self.inner.upload(document).await;

        match &result {
            Ok(response) => tracing::info!(
                operation = "upload",
                duration_ms = %started.elapsed().as_millis(),
                filename = %document.filename(),
                size_bytes = document.size_bytes(),
                session_id = %response.session_id,
                chunks_processed = response.chunks_processed,
                message = %response.message,
                "Document service request completed"
            ),
            Err(e) => log_failure("upload", started, e),
        }
        result
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let started = Instant::now();
        let result = self.inner.chat(request).await;

        match &result {
            Ok(response) => tracing::info!(
                operation = "chat",
                duration_ms = %started.elapsed().as_millis(),
                session_id = %request.session_id,
                response_chars = response.response.chars().count(),
                "Document service request completed"
            ),
            Err(e) => log_failure("chat", started, e),
        }
        result
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), TransportError> {
        let started = Instant::now();
        let result = self.inner.delete_session(session_id).await;

        match &result {
            Ok(()) => tracing::info!(
                operation = "delete_session",
                duration_ms = %started.elapsed().as_millis(),
                session_id = %session_id,
                "Document service request completed"
            ),
            Err(e) => log_failure("delete_session", started, e),
        }
        result
    }

    async fn health_check(&self) -> Result<HealthResponse, TransportError> {
        let started = Instant::now();
        let result = self.inner.health_check().await;

        match &result {
            Ok(health) => tracing::debug!(
                operation = "health_check",
                duration_ms = %started.elapsed().as_millis(),
                status = %health.status,
                active_sessions = health.active_sessions,
                "Document service request completed"
            ),
            Err(e) => log_failure("health_check", started, e),
        }
        result
    }
}
