//! HTTP implementation of the document service client

use super::{
    ChatRequest, ChatResponse, DocumentService, HealthResponse, SessionId, TransportError,
    UploadResponse,
};
use crate::config::ClientConfig;
use crate::document::Document;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// reqwest-backed client. Every call is a single attempt bounded by the
/// configured timeout.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<String, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(TransportError::from_status(status, &body));
        }
        Ok(body)
    }

    async fn send_json<R: DeserializeOwned>(request: RequestBuilder) -> Result<R, TransportError> {
        let body = Self::send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            TransportError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

#[async_trait]
impl DocumentService for HttpTransport {
    async fn upload(&self, document: &Document) -> Result<UploadResponse, TransportError> {
        let part = Part::bytes(document.bytes().to_vec())
            .file_name(document.filename().to_string())
            .mime_str(document.content_type())
            .map_err(|e| TransportError::network(format!("Invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        Self::send_json(self.client.post(self.url("/upload")).multipart(form)).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        Self::send_json(self.client.post(self.url("/chat")).json(request)).await
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), TransportError> {
        Self::send(self.client.delete(self.url(&format!("/session/{session_id}"))))
            .await
            .map(|_| ())
    }

    async fn health_check(&self) -> Result<HealthResponse, TransportError> {
        Self::send_json(self.client.get(self.url("/health"))).await
    }
}
