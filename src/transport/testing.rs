//! Mock document service for testing
//!
//! Responses are queued per operation and every call is recorded. Uploads
//! and chats can be held in flight until the test releases them.

use super::*;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct Gate {
    held: Mutex<Option<Arc<Notify>>>,
    started: Notify,
}

impl Gate {
    fn hold(&self) {
        *self.held.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    fn release(&self) {
        if let Some(gate) = self.held.lock().unwrap().take() {
            gate.notify_one();
        }
    }

    async fn pass(&self) {
        self.started.notify_one();
        let gate = self.held.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[derive(Default)]
pub struct MockTransport {
    uploads: Mutex<VecDeque<Result<UploadResponse, TransportError>>>,
    chats: Mutex<VecDeque<Result<ChatResponse, TransportError>>>,
    fail_deletes: Mutex<bool>,
    upload_gate: Gate,
    chat_gate: Gate,
    /// Filenames of every upload call
    pub upload_calls: Mutex<Vec<String>>,
    /// Every chat request in call order
    pub chat_calls: Mutex<Vec<ChatRequest>>,
    /// Every session id passed to `delete_session`
    pub delete_calls: Mutex<Vec<SessionId>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_upload(&self, session_id: &str, filename: &str, chunks_processed: u64) {
        self.uploads.lock().unwrap().push_back(Ok(UploadResponse {
            session_id: SessionId::new(session_id),
            filename: filename.to_string(),
            chunks_processed,
            message: "Document processed successfully".to_string(),
        }));
    }

    pub fn queue_upload_error(&self, error: TransportError) {
        self.uploads.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_reply(&self, session_id: &str, response: &str) {
        self.chats.lock().unwrap().push_back(Ok(ChatResponse {
            response: response.to_string(),
            session_id: SessionId::new(session_id),
        }));
    }

    pub fn queue_chat_error(&self, error: TransportError) {
        self.chats.lock().unwrap().push_back(Err(error));
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    /// Make uploads wait until `release_upload`
    pub fn hold_uploads(&self) {
        self.upload_gate.hold();
    }

    pub fn release_upload(&self) {
        self.upload_gate.release();
    }

    /// Make chats wait until `release_chat`
    pub fn hold_chats(&self) {
        self.chat_gate.hold();
    }

    pub fn release_chat(&self) {
        self.chat_gate.release();
    }

    /// Resolves once a chat call has reached the service
    pub async fn chat_started(&self) {
        self.chat_gate.started.notified().await;
    }

    /// Resolves once an upload call has reached the service
    pub async fn upload_started(&self) {
        self.upload_gate.started.notified().await;
    }

    pub fn queued_replies(&self) -> usize {
        self.chats.lock().unwrap().len()
    }

    pub fn recorded_chats(&self) -> Vec<ChatRequest> {
        self.chat_calls.lock().unwrap().clone()
    }

    pub fn recorded_uploads(&self) -> Vec<String> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn recorded_deletes(&self) -> Vec<SessionId> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Poll until `count` deletes were recorded or the timeout elapses
    pub async fn wait_for_deletes(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.delete_calls.lock().unwrap().len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}

#[async_trait]
impl DocumentService for MockTransport {
    async fn upload(&self, document: &Document) -> Result<UploadResponse, TransportError> {
        self.upload_calls
            .lock()
            .unwrap()
            .push(document.filename().to_string());
        self.upload_gate.pass().await;
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock upload queued")))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.chat_calls.lock().unwrap().push(request.clone());
        self.chat_gate.pass().await;
        self.chats
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock reply queued")))
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<(), TransportError> {
        self.delete_calls.lock().unwrap().push(session_id.clone());
        if *self.fail_deletes.lock().unwrap() {
            return Err(TransportError::network("Connection failed: refused"));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthResponse, TransportError> {
        Ok(HealthResponse {
            status: "healthy".to_string(),
            active_sessions: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_queues() {
        let mock = MockTransport::new();
        mock.queue_reply("s1", "Hello");

        let request = ChatRequest::new(SessionId::new("s1"), "hi");
        let response = mock.chat(&request).await.unwrap();
        assert_eq!(response.response, "Hello");

        // Second call should fail (no more responses)
        assert!(mock.chat(&request).await.is_err());
        assert_eq!(mock.recorded_chats().len(), 2);
    }

    #[tokio::test]
    async fn test_held_chat_waits_for_release() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_reply("s1", "late");
        mock.hold_chats();

        let task = tokio::spawn({
            let mock = mock.clone();
            async move {
                mock.chat(&ChatRequest::new(SessionId::new("s1"), "q"))
                    .await
            }
        });

        mock.chat_started().await;
        assert!(!task.is_finished());
        mock.release_chat();

        let response = task.await.unwrap().unwrap();
        assert_eq!(response.response, "late");
    }
}
