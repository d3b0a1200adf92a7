// src/llm/client.rs
use async_trait::async_trait;

use super::CompletionRequest;
use crate::error::CompletionError;

/// Text-completion backend: ordered role-tagged messages in, one text out.
///
/// Calls are independent; no conversation state lives in the client.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
