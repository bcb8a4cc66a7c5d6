//! Route handler functions.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use yaad_core::config::DurableBackendKind;
use yaad_dialogue::SkillRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// Response for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy", or "degraded" when the configured durable store could not be opened.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub durable_backend: String,
    pub degraded_operations: u64,
    pub active_conversations: usize,
}

/// POST /skill - handle one platform turn.
///
/// A body that does not parse as a turn still gets the spoken apology with a
/// 200. Only an oversized body is refused at the HTTP level.
pub async fn skill(
    State(state): State<AppState>,
    payload: Result<Json<SkillRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => Json(state.skill.handle(request).await).into_response(),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            rejection.into_response()
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Malformed turn");
            Json(state.skill.malformed_reply()).into_response()
        }
    }
}

/// GET /health - liveness plus durable-store status.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let store = state.skill.item_store();
    let backend = store.backend_name();
    let missing_backend =
        state.config.durable.backend != DurableBackendKind::None && backend == "none";

    Ok(Json(HealthResponse {
        status: if missing_backend { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        durable_backend: backend.to_string(),
        degraded_operations: store.degraded_operations(),
        active_conversations: store.active_conversations()?,
    }))
}
