// src/llm/mod.rs
pub mod client;
#[cfg(test)]
pub mod mock;
pub mod openai;
pub mod types;

pub use client::CompletionClient;
pub use openai::OpenAiClient;
pub use types::{ChatMessage, CompletionRequest, Role};
