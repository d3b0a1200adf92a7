// src/agent/plan_update.rs
//! Plan update step: one completion call that rewrites the plan document.

use crate::agent::formatting::clean_response_formatting;
use crate::agent::prompts::{
    plan_structure, EXISTING_PLAN_MARKER, FALLBACK_PLAN, FRESH_INSTRUCTIONS, FRESH_TASK, MERGE_INSTRUCTIONS,
    MERGE_TASK, PLAN_UPDATE_TRIGGER,
};
use crate::error::CompletionError;
use crate::llm::{ChatMessage, CompletionClient, CompletionRequest, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// No prior plan: generate an illustrative one from scratch.
    Fresh,
    /// Prior plan exists: revise it without dropping content.
    Merge,
}

impl PlanMode {
    pub fn for_plan(current_plan: &str) -> Self {
        if current_plan.trim().is_empty() {
            PlanMode::Fresh
        } else {
            PlanMode::Merge
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanMode::Fresh => "fresh",
            PlanMode::Merge => "merge",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanUpdateInput<'a> {
    pub message: &'a str,
    pub history: &'a [ChatMessage],
    pub current_plan: &'a str,
}

impl PlanUpdateInput<'_> {
    pub fn mode(&self) -> PlanMode {
        PlanMode::for_plan(self.current_plan)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanUpdateOutcome {
    Updated(String),
    /// The call failed; the generic fallback plan stands in.
    Fallback { plan: String, error: CompletionError },
    /// The call succeeded but produced no text.
    Unchanged,
}

impl PlanUpdateOutcome {
    /// Plan text produced this turn, if any.
    pub fn plan(&self) -> Option<&str> {
        match self {
            PlanUpdateOutcome::Updated(plan) | PlanUpdateOutcome::Fallback { plan, .. } => Some(plan),
            PlanUpdateOutcome::Unchanged => None,
        }
    }

    pub fn into_plan(self) -> Option<String> {
        match self {
            PlanUpdateOutcome::Updated(plan) | PlanUpdateOutcome::Fallback { plan, .. } => Some(plan),
            PlanUpdateOutcome::Unchanged => None,
        }
    }
}

fn joined_contents(history: &[ChatMessage], role: Role) -> String {
    history
        .iter()
        .filter(|m| m.role == role)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of prior turns: user inputs and assistant responses as two blocks.
pub fn history_digest(history: &[ChatMessage]) -> String {
    format!(
        "User Inputs: {}\n\nAssistant Responses: {}",
        joined_contents(history, Role::User),
        joined_contents(history, Role::Assistant)
    )
}

pub fn build_plan_update_prompt(input: &PlanUpdateInput<'_>) -> String {
    let mode = input.mode();
    let (goal, task, instructions, closing) = match mode {
        PlanMode::Fresh => ("CREATE A NEW COMPREHENSIVE APP PLAN", FRESH_TASK, FRESH_INSTRUCTIONS, "INITIAL"),
        PlanMode::Merge => ("UPDATE THE EXISTING APP PLAN", MERGE_TASK, MERGE_INSTRUCTIONS, "UPDATED"),
    };

    let mut blocks = vec![
        format!("You are an expert app planner. Your task is to {} with information from the conversation.", goal),
        "CRITICAL: You must output ONLY the app plan structure below. Do not ask questions, do not continue the conversation, do not respond conversationally.".to_string(),
        format!("TASK: {}", task),
        format!("PLAN STRUCTURE - OUTPUT THIS EXACT FORMAT:\n\n{}", plan_structure()),
    ];

    if mode == PlanMode::Merge {
        blocks.push(format!("{}\n{}", EXISTING_PLAN_MARKER, input.current_plan));
    }

    blocks.push(format!("INFORMATION FROM CONVERSATION:\n{}", history_digest(input.history)));
    blocks.push(format!("CURRENT CONTEXT: {}", input.message));
    blocks.push(format!("INSTRUCTIONS:\n{}", instructions));
    blocks.push(format!(
        "NOW GENERATE THE {} STRUCTURED PLAN (no conversation, just the plan):",
        closing
    ));

    blocks.join("\n\n")
}

/// History is summarised into the system prompt, not replayed as turns.
pub fn build_plan_update_request(input: &PlanUpdateInput<'_>) -> CompletionRequest {
    CompletionRequest::new(vec![
        ChatMessage::system(build_plan_update_prompt(input)),
        ChatMessage::user(PLAN_UPDATE_TRIGGER),
    ])
}

pub fn fallback_plan() -> String {
    clean_response_formatting(FALLBACK_PLAN)
}

/// Never fails: upstream errors degrade to the fallback plan.
pub async fn update_plan(client: &dyn CompletionClient, input: &PlanUpdateInput<'_>) -> PlanUpdateOutcome {
    tracing::debug!(
        mode = input.mode().as_str(),
        current_plan_len = input.current_plan.len(),
        "updating app plan"
    );

    match client.complete(build_plan_update_request(input)).await {
        Ok(raw) => {
            let plan = clean_response_formatting(&raw);
            if plan.is_empty() {
                tracing::warn!("plan update returned empty text; keeping previous plan");
                PlanUpdateOutcome::Unchanged
            } else {
                PlanUpdateOutcome::Updated(plan)
            }
        }
        Err(error) => {
            tracing::warn!(error = %error, "plan update failed; serving fallback plan");
            PlanUpdateOutcome::Fallback { plan: fallback_plan(), error }
        }
    }
}
