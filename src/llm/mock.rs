// src/llm/mock.rs
//! Scripted completion client for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{CompletionClient, CompletionRequest};
use crate::error::CompletionError;

/// Replays queued results in order and records every request it receives.
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    pub fn new(responses: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience for scripts where every call succeeds.
    pub fn with_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn failure(message: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Transport(message.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::InvalidResponse("No more mock responses".to_string())))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[tokio::test]
    async fn test_mock_replays_in_order_then_errors() {
        let client = MockCompletionClient::new(vec![
            Ok("first".to_string()),
            MockCompletionClient::failure("boom"),
        ]);
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);

        assert_eq!(client.complete(request.clone()).await.unwrap(), "first");
        assert!(client.complete(request.clone()).await.is_err());
        assert!(matches!(
            client.complete(request).await,
            Err(CompletionError::InvalidResponse(_))
        ));
        assert_eq!(client.call_count(), 3);
    }
}
