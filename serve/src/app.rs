//! Axum app: shared state and the `/generate` route.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use weft::{LlmClient, Message};

use super::response::{ApiError, GenerateRequest, GenerateResponse};

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmClient>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .with_state(state)
}

async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let input = request
        .input
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing \"input\"".to_string()))?;

    tracing::debug!(len = input.len(), "generate");
    let response = state
        .llm
        .invoke(&[Message::user(input)])
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "generate failed");
            ApiError::Upstream(e.to_string())
        })?;
    Ok(Json(GenerateResponse {
        message: response.content,
    }))
}
