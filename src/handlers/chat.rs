// src/handlers/chat.rs
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use std::sync::Arc;

use crate::models::chat::{ChatRequest, ChatResponse, ErrorResponse};
use crate::AppState;

pub fn chat_routes() -> Router {
    Router::new().route("/api/chat", post(chat_handler))
}

/// POST /api/chat - run one planning turn
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected chat request body: {}", rejection.body_text());
            let body = ErrorResponse {
                error: format!("Invalid request body: {}", rejection.body_text()),
            };
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match state.agent.process_chat(request.into()).await {
        Ok(output) => (StatusCode::OK, Json(ChatResponse::from(output))).into_response(),
        Err(e) => e.into_response(),
    }
}
