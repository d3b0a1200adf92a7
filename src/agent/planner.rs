// src/agent/planner.rs
//! Turn orchestrator: validates input, resets plan state from the request, runs the turn.

use std::sync::Arc;

use crate::agent::turn::{Turn, TurnOutput};
use crate::error::PlannerError;
use crate::llm::{ChatMessage, CompletionClient};

/// One chat turn as received from the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
    /// `None` means the client has no plan; the turn starts fresh.
    pub current_plan: Option<String>,
}

/// Stateless across turns: every call carries its own history and plan.
#[derive(Clone)]
pub struct AppPlannerAgent {
    client: Arc<dyn CompletionClient>,
}

impl AppPlannerAgent {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub async fn process_chat(&self, request: TurnRequest) -> Result<TurnOutput, PlannerError> {
        if request.message.is_empty() {
            return Err(PlannerError::InvalidInput);
        }

        let current_plan = request.current_plan.unwrap_or_default();
        tracing::info!(
            message_len = request.message.len(),
            history_len = request.history.len(),
            has_plan = !current_plan.trim().is_empty(),
            model = self.client.model_name(),
            "processing chat turn"
        );

        let turn = Turn::new(&request.message, &request.history, &current_plan)
            .run(self.client.as_ref())
            .await;
        tracing::debug!(trace = ?turn.trace(), "turn finished");

        turn.finish().map_err(PlannerError::from)
    }
}
