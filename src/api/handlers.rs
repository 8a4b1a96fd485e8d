//! Session API handler functions

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use super::service::SessionService;
use super::types::{StartJourneyRequest, SubmitStepRequest};

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<SessionService>,
}

/// GET /api/session
pub async fn get_session(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.service.session())
}

/// GET /api/renderers/{tag}
pub async fn get_renderer(
    State(state): State<ApiState>,
    Path(tag): Path<String>,
) -> impl IntoResponse {
    Json(state.service.renderer(&tag))
}

/// GET /api/journey
pub async fn get_journey(State(state): State<ApiState>) -> Response {
    match state.service.journey().await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/journey/start
pub async fn start_journey(
    State(state): State<ApiState>,
    payload: Option<Json<StartJourneyRequest>>,
) -> Response {
    let Json(payload) = payload.unwrap_or_default();
    tracing::info!(journey = ?payload.journey, "Received POST /api/journey/start request");

    match state.service.start_journey(payload.journey).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/journey/submit
pub async fn submit_step(
    State(state): State<ApiState>,
    Json(payload): Json<SubmitStepRequest>,
) -> Response {
    tracing::debug!(
        field_count = payload.values.len(),
        "Received POST /api/journey/submit request"
    );

    match state.service.submit(payload.values).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/logout
pub async fn logout(State(state): State<ApiState>) -> Response {
    match state.service.logout().await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/logout/cancel-redirect
pub async fn cancel_redirect(State(state): State<ApiState>) -> impl IntoResponse {
    Json(state.service.cancel_redirect())
}
