// src/agent/turn.rs
//! One chat turn as an explicit state machine:
//!
//! ```text
//! PendingUpdate -> Updated | Fallback | Unchanged -> PendingReply(Primary)
//!     -> Replied
//!     -> PendingReply(Simplified) -> Replied | Failed
//! ```
//!
//! All state is owned by the turn; nothing is shared between concurrent turns.

use std::mem;

use crate::agent::plan_update::{update_plan, PlanUpdateInput, PlanUpdateOutcome};
use crate::agent::reply::{request_reply, with_update_notice, ReplyAttempt, ReplyInput};
use crate::error::CompletionError;
use crate::llm::{ChatMessage, CompletionClient};

/// Observable phase of a turn, recorded on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    PendingUpdate,
    Updated,
    Fallback,
    Unchanged,
    PendingReply(ReplyAttempt),
    Replied,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutput {
    pub reply: String,
    pub updated_plan: Option<String>,
}

#[derive(Debug)]
enum TurnState {
    PendingUpdate,
    PlanResolved(PlanUpdateOutcome),
    PendingReply { outcome: PlanUpdateOutcome, attempt: ReplyAttempt },
    Replied(TurnOutput),
    Failed(CompletionError),
}

impl TurnState {
    fn phase(&self) -> TurnPhase {
        match self {
            TurnState::PendingUpdate => TurnPhase::PendingUpdate,
            TurnState::PlanResolved(PlanUpdateOutcome::Updated(_)) => TurnPhase::Updated,
            TurnState::PlanResolved(PlanUpdateOutcome::Fallback { .. }) => TurnPhase::Fallback,
            TurnState::PlanResolved(PlanUpdateOutcome::Unchanged) => TurnPhase::Unchanged,
            TurnState::PendingReply { attempt, .. } => TurnPhase::PendingReply(*attempt),
            TurnState::Replied(_) => TurnPhase::Replied,
            TurnState::Failed(_) => TurnPhase::Failed,
        }
    }
}

pub struct Turn<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
    client_plan: &'a str,
    state: TurnState,
    trace: Vec<TurnPhase>,
}

impl<'a> Turn<'a> {
    pub fn new(message: &'a str, history: &'a [ChatMessage], client_plan: &'a str) -> Self {
        Self {
            message,
            history,
            client_plan,
            state: TurnState::PendingUpdate,
            trace: vec![TurnPhase::PendingUpdate],
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.state.phase()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, TurnState::Replied(_) | TurnState::Failed(_))
    }

    pub fn trace(&self) -> &[TurnPhase] {
        &self.trace
    }

    /// Performs exactly one transition. Terminal states are left as they are.
    pub async fn advance(&mut self, client: &dyn CompletionClient) {
        if self.is_terminal() {
            return;
        }
        // Take ownership of the current state; it is always replaced below
        let current = mem::replace(&mut self.state, TurnState::PendingUpdate);
        let next = match current {
            TurnState::PendingUpdate => {
                // Plan update never fails; errors come back as a fallback outcome
                let input = PlanUpdateInput {
                    message: self.message,
                    history: self.history,
                    current_plan: self.client_plan,
                };
                TurnState::PlanResolved(update_plan(client, &input).await)
            }
            // Plan settled, start with the full reply prompt
            TurnState::PlanResolved(outcome) => TurnState::PendingReply {
                outcome,
                attempt: ReplyAttempt::Primary,
            },
            TurnState::PendingReply { outcome, attempt } => {
                // Reply against this turn's plan, or the client's when none was produced
                let input = ReplyInput {
                    message: self.message,
                    history: self.history,
                    plan: outcome.plan().unwrap_or(self.client_plan),
                };
                match request_reply(client, &input, attempt).await {
                    Ok(reply) => {
                        let reply = with_update_notice(reply, outcome.plan().is_some());
                        TurnState::Replied(TurnOutput {
                            reply,
                            updated_plan: outcome.into_plan(),
                        })
                    }
                    // One more try with the simplified prompt, then give up
                    Err(error) => match attempt.next() {
                        Some(next_attempt) => {
                            tracing::warn!(error = %error, ?attempt, "reply attempt failed; retrying with simplified prompt");
                            TurnState::PendingReply { outcome, attempt: next_attempt }
                        }
                        None => {
                            tracing::error!(error = %error, "reply generation failed on every attempt");
                            TurnState::Failed(error)
                        }
                    },
                }
            }
            terminal @ (TurnState::Replied(_) | TurnState::Failed(_)) => terminal,
        };

        // Record the transition
        self.state = next;
        let phase = self.state.phase();
        tracing::debug!(?phase, "turn transition");
        self.trace.push(phase);
    }

    pub async fn run(mut self, client: &dyn CompletionClient) -> Self {
        while !self.is_terminal() {
            self.advance(client).await;
        }
        self
    }

    pub fn finish(self) -> Result<TurnOutput, CompletionError> {
        match self.state {
            TurnState::Replied(output) => Ok(output),
            TurnState::Failed(error) => Err(error),
            other => Err(CompletionError::InvalidResponse(format!(
                "turn finished early in phase {:?}",
                other.phase()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::plan_update::fallback_plan;
    use crate::agent::prompts::PLAN_UPDATED_NOTICE;
    use crate::llm::mock::MockCompletionClient;

    #[tokio::test]
    async fn test_happy_path_trace() {
        let client = MockCompletionClient::with_texts(&["## 🎯 Key Features\n\n- Todos", "Here is your plan."]);
        let turn = Turn::new("I want a todo app", &[], "").run(&client).await;

        assert_eq!(
            turn.trace(),
            &[
                TurnPhase::PendingUpdate,
                TurnPhase::Updated,
                TurnPhase::PendingReply(ReplyAttempt::Primary),
                TurnPhase::Replied,
            ]
        );
        let output = turn.finish().unwrap();
        assert_eq!(output.updated_plan.as_deref(), Some("## 🎯 Key Features\n\n- Todos"));
        assert_eq!(output.reply, format!("Here is your plan.\n\n{}", PLAN_UPDATED_NOTICE));
    }

    #[tokio::test]
    async fn test_advance_is_one_step_at_a_time() {
        let client = MockCompletionClient::with_texts(&["plan", "reply"]);
        let mut turn = Turn::new("hi", &[], "");

        assert_eq!(turn.phase(), TurnPhase::PendingUpdate);
        turn.advance(&client).await;
        assert_eq!(turn.phase(), TurnPhase::Updated);
        assert_eq!(client.call_count(), 1);
        turn.advance(&client).await;
        assert_eq!(turn.phase(), TurnPhase::PendingReply(ReplyAttempt::Primary));
        assert_eq!(client.call_count(), 1);
        turn.advance(&client).await;
        assert!(turn.is_terminal());
        turn.advance(&client).await;
        assert_eq!(client.call_count(), 2);
        assert_eq!(turn.trace().len(), 4);
    }

    #[tokio::test]
    async fn test_update_failure_then_simplified_reply() {
        let client = MockCompletionClient::new(vec![
            MockCompletionClient::failure("update down"),
            MockCompletionClient::failure("primary down"),
            Ok("Plan updated for you.".to_string()),
        ]);
        let turn = Turn::new("Add reminders", &[], "old plan").run(&client).await;

        assert_eq!(
            turn.trace(),
            &[
                TurnPhase::PendingUpdate,
                TurnPhase::Fallback,
                TurnPhase::PendingReply(ReplyAttempt::Primary),
                TurnPhase::PendingReply(ReplyAttempt::Simplified),
                TurnPhase::Replied,
            ]
        );

        let requests = client.requests();
        let simplified = requests[2].system_prompt().unwrap();
        assert!(simplified.contains(&fallback_plan()));
        assert!(simplified.contains("Remember:"));

        let output = turn.finish().unwrap();
        assert_eq!(output.reply, "Plan updated for you.");
        assert_eq!(output.updated_plan, Some(fallback_plan()));
    }

    #[tokio::test]
    async fn test_both_reply_attempts_fail() {
        let client = MockCompletionClient::new(vec![
            Ok("plan".to_string()),
            MockCompletionClient::failure("primary down"),
            MockCompletionClient::failure("simplified down"),
        ]);
        let turn = Turn::new("hi", &[], "").run(&client).await;

        assert_eq!(turn.phase(), TurnPhase::Failed);
        assert_eq!(
            turn.finish(),
            Err(CompletionError::Transport("simplified down".to_string()))
        );
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unchanged_plan_uses_client_plan_without_notice() {
        let client = MockCompletionClient::with_texts(&["   ", "Noted."]);
        let turn = Turn::new("hi", &[], "CLIENT PLAN").run(&client).await;

        assert_eq!(turn.trace()[1], TurnPhase::Unchanged);
        let reply_prompt = client.requests()[1].system_prompt().unwrap().to_string();
        assert!(reply_prompt.contains("CURRENT APP PLAN:\nCLIENT PLAN"));

        let output = turn.finish().unwrap();
        assert_eq!(output.reply, "Noted.");
        assert_eq!(output.updated_plan, None);
    }
}
