// src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Failure of a single upstream completion call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompletionError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Message is required")]
    InvalidInput,
    #[error("Reply generation failed: {0}")]
    Completion(#[from] CompletionError),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        match self {
            PlannerError::InvalidInput => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() }))).into_response()
            }
            PlannerError::Completion(ref err) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = %error_id, error = %err, "chat turn failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PlannerError::InvalidInput.into_response().status(), StatusCode::BAD_REQUEST);
        let err = PlannerError::from(CompletionError::Transport("down".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
