// src/models/chat.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::{TurnOutput, TurnRequest};
use crate::llm::{ChatMessage, Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    /// Missing or unknown roles are replayed as system turns.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    /// Anything other than a JSON string resets the plan.
    #[serde(default)]
    pub current_app_plan: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_plan: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        ChatMessage {
            role: Role::from_wire(&entry.role),
            content: entry.content,
        }
    }
}

impl From<ChatRequest> for TurnRequest {
    fn from(request: ChatRequest) -> Self {
        TurnRequest {
            message: request.message.unwrap_or_default(),
            history: request.conversation_history.into_iter().map(ChatMessage::from).collect(),
            current_plan: match request.current_app_plan {
                Some(Value::String(plan)) => Some(plan),
                _ => None,
            },
        }
    }
}

impl From<TurnOutput> for ChatResponse {
    fn from(output: TurnOutput) -> Self {
        ChatResponse {
            response: output.reply,
            app_plan: output.updated_plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_uses_camel_case_and_defaults() {
        let request: ChatRequest = serde_json::from_value(json!({ "message": "hi" })).unwrap();
        let turn = TurnRequest::from(request);
        assert_eq!(turn.message, "hi");
        assert!(turn.history.is_empty());
        assert_eq!(turn.current_plan, None);

        let request: ChatRequest = serde_json::from_value(json!({
            "message": "more",
            "conversationHistory": [
                { "role": "user", "content": "a" },
                { "role": "assistant", "content": "b" },
                { "role": "tool", "content": "c" }
            ],
            "currentAppPlan": "## 🎯 Key Features"
        }))
        .unwrap();
        let turn = TurnRequest::from(request);
        let roles: Vec<Role> = turn.history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::System]);
        assert_eq!(turn.current_plan.as_deref(), Some("## 🎯 Key Features"));
    }

    #[test]
    fn test_history_entry_without_role_is_system() {
        let request: ChatRequest = serde_json::from_value(json!({
            "message": "hi",
            "conversationHistory": [{ "content": "no role here" }]
        }))
        .unwrap();
        let turn = TurnRequest::from(request);
        assert_eq!(turn.history, vec![ChatMessage::system("no role here")]);
    }

    #[test]
    fn test_non_string_plan_resets() {
        for plan in [json!(null), json!(42), json!({ "plan": "x" })] {
            let request: ChatRequest =
                serde_json::from_value(json!({ "message": "hi", "currentAppPlan": plan })).unwrap();
            assert_eq!(TurnRequest::from(request).current_plan, None);
        }
    }

    #[test]
    fn test_response_omits_absent_plan() {
        let body = serde_json::to_value(ChatResponse { response: "ok".to_string(), app_plan: None }).unwrap();
        assert_eq!(body, json!({ "response": "ok" }));

        let body = serde_json::to_value(ChatResponse {
            response: "ok".to_string(),
            app_plan: Some("plan".to_string()),
        })
        .unwrap();
        assert_eq!(body, json!({ "response": "ok", "appPlan": "plan" }));
    }
}
