// src/agent/mod.rs
pub mod formatting;
pub mod plan_update;
pub mod planner;
pub mod prompts;
pub mod reply;
pub mod turn;

pub use planner::{AppPlannerAgent, TurnRequest};
pub use turn::TurnOutput;
