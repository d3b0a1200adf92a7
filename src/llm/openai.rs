// src/llm/openai.rs
//! Hosted Chat Completions client

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, CompletionClient, CompletionRequest};
use crate::config::LlmConfig;
use crate::error::CompletionError;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    request_timeout: Duration,
    retry_budget: Duration,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        Self {
            role: message.role.as_str(),
            content: &message.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503)
}

fn into_completion_error(error: backoff::Error<CompletionError>) -> CompletionError {
    match error {
        backoff::Error::Permanent(err) => err,
        backoff::Error::Transient { err, .. } => err,
    }
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            request_timeout: config.request_timeout,
            retry_budget: config.retry_budget,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn extract_text(response_text: &str) -> Result<String, CompletionError> {
        let parsed: ChatCompletionResponse = serde_json::from_str(response_text).map_err(|e| {
            CompletionError::InvalidResponse(format!("Failed to parse response: {}. Response: {}", e, response_text))
        })?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion usage"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::InvalidResponse("Response contained no message content".to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            "Completion request: {} messages ({} chars), model {}",
            body.messages.len(),
            request.full_text().len(),
            self.model
        );

        // Only transport failures and overload statuses are transient; everything else is final
        let operation = || async {
            // Send the request; connect and timeout failures may succeed on another attempt
            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .timeout(self.request_timeout)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!("Completion API connection error (transient): {}", e);
                        backoff::Error::transient(CompletionError::Transport(e.to_string()))
                    } else {
                        tracing::error!("Completion API request error: {}", e);
                        backoff::Error::permanent(CompletionError::Transport(e.to_string()))
                    }
                })?;

            // Read the body before checking status so upstream error details are kept
            let status = response.status();
            let response_text = response
                .text()
                .await
                .map_err(|e| backoff::Error::permanent(CompletionError::Transport(format!("Failed to read response: {}", e))))?;

            if is_retryable_status(status.as_u16()) {
                tracing::warn!("Completion API returned {} (transient)", status);
                return Err(backoff::Error::transient(CompletionError::Status {
                    status: status.as_u16(),
                    body: response_text,
                }));
            }

            if !status.is_success() {
                tracing::error!("Completion API permanent error ({}): {}", status, response_text);
                return Err(backoff::Error::permanent(CompletionError::Status {
                    status: status.as_u16(),
                    body: response_text,
                }));
            }

            // Pull the assistant text out of the first choice
            Self::extract_text(&response_text).map_err(backoff::Error::permanent)
        };

        // No retry budget: exactly one upstream call
        if self.retry_budget.is_zero() {
            return operation().await.map_err(into_completion_error);
        }

        let backoff_config = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            max_elapsed_time: Some(self.retry_budget),
            ..Default::default()
        };

        retry(backoff_config, operation).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{http::StatusCode, routing::post, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Local upstream that always answers 503 and counts hits.
    async fn unavailable_upstream() -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let stub = Router::new().route(
            "/v1/chat/completions",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });
        (format!("http://{}/v1", addr), hits)
    }

    #[tokio::test]
    async fn test_default_config_makes_a_single_upstream_call() {
        let (base_url, hits) = unavailable_upstream().await;
        let config = AppConfig::from_lookup(|name| match name {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "OPENAI_BASE_URL" => Some(base_url.clone()),
            _ => None,
        })
        .unwrap();
        let client = OpenAiClient::new(&config.llm);

        let result = client
            .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await;

        assert!(matches!(result, Err(CompletionError::Status { status: 503, .. })));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extract_text_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}],"usage":{"prompt_tokens":3,"completion_tokens":1}}"#;
        assert_eq!(OpenAiClient::extract_text(body).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_rejects_missing_content() {
        let no_choices = r#"{"choices":[]}"#;
        assert!(matches!(
            OpenAiClient::extract_text(no_choices),
            Err(CompletionError::InvalidResponse(_))
        ));

        let null_content = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert!(OpenAiClient::extract_text(null_content).is_err());

        assert!(OpenAiClient::extract_text("not json").is_err());
    }

    #[test]
    fn test_request_body_uses_wire_roles() {
        let messages = vec![ChatMessage::system("persona"), ChatMessage::user("hi")];
        let body = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: 0.7,
            max_tokens: 1000,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(400));
        assert!(!is_retryable_status(401));
    }
}
