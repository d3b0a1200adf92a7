// src/agent/reply.rs
//! Conversational reply step: persona + plan context + replayed history.

use crate::agent::prompts::{
    APP_PLANNER_SYSTEM_PROMPT, CURRENT_PLAN_MARKER, PLAN_UPDATED_NOTICE, REPLY_REINFORCEMENT, SIMPLIFIED_REMINDER,
};
use crate::error::CompletionError;
use crate::llm::{ChatMessage, CompletionClient, CompletionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAttempt {
    /// Persona plus the full reinforcement rules.
    Primary,
    /// Persona plus a one-line reminder; used once after the primary attempt fails.
    Simplified,
}

impl ReplyAttempt {
    pub fn next(&self) -> Option<ReplyAttempt> {
        match self {
            ReplyAttempt::Primary => Some(ReplyAttempt::Simplified),
            ReplyAttempt::Simplified => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplyInput<'a> {
    pub message: &'a str,
    pub history: &'a [ChatMessage],
    /// Plan used as context: this turn's result, or the client's plan when none was produced.
    pub plan: &'a str,
}

pub fn build_reply_system_prompt(plan: &str, attempt: ReplyAttempt) -> String {
    if plan.is_empty() {
        return APP_PLANNER_SYSTEM_PROMPT.to_string();
    }
    let rules = match attempt {
        ReplyAttempt::Primary => REPLY_REINFORCEMENT,
        ReplyAttempt::Simplified => SIMPLIFIED_REMINDER,
    };
    format!(
        "{}\n\n{}\n{}\n\n{}",
        APP_PLANNER_SYSTEM_PROMPT, CURRENT_PLAN_MARKER, plan, rules
    )
}

pub fn build_reply_request(input: &ReplyInput<'_>, attempt: ReplyAttempt) -> CompletionRequest {
    let mut messages = Vec::with_capacity(input.history.len() + 2);
    messages.push(ChatMessage::system(build_reply_system_prompt(input.plan, attempt)));
    messages.extend(input.history.iter().cloned());
    messages.push(ChatMessage::user(input.message));
    CompletionRequest::new(messages)
}

pub async fn request_reply(
    client: &dyn CompletionClient,
    input: &ReplyInput<'_>,
    attempt: ReplyAttempt,
) -> Result<String, CompletionError> {
    tracing::debug!(?attempt, history_len = input.history.len(), "requesting reply");
    client.complete(build_reply_request(input, attempt)).await
}

/// Appends the canvas notice when a plan was produced and the reply doesn't already say so.
/// "updated" is matched in any letter case.
pub fn with_update_notice(reply: String, plan_produced: bool) -> String {
    if !plan_produced || reply.to_lowercase().contains("updated") {
        return reply;
    }
    format!("{}\n\n{}", reply, PLAN_UPDATED_NOTICE)
}
