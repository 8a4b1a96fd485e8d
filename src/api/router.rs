//! Session API routing configuration

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::{
    handlers::{
        ApiState, cancel_redirect, get_journey, get_renderer, get_session, logout, start_journey,
        submit_step,
    },
    middleware::{ApiKey, auth_middleware, cors_layer},
    service::SessionService,
};

/// Create the session API router
///
/// # Endpoints
/// - `GET /api/session` - Session state, logout status, pending redirect
/// - `GET /api/renderers/{tag}` - Renderer a step type resolves to
/// - `GET /api/journey` - Current journey status
/// - `POST /api/journey/start` - Start (or restart) a journey
/// - `POST /api/journey/submit` - Fill and submit the current step
/// - `POST /api/logout` - Log out and schedule the redirect home
/// - `POST /api/logout/cancel-redirect` - Cancel a pending redirect
///
/// # Authentication
/// When `api_key` is set, every route requires it via `x-api-key` or
/// `Authorization: Bearer <key>`
pub fn create_router(service: Arc<SessionService>, api_key: Option<&str>) -> Router {
    let state = ApiState { service };

    let mut api_routes = Router::new()
        .route("/session", get(get_session))
        .route("/renderers/{tag}", get(get_renderer))
        .route("/journey", get(get_journey))
        .route("/journey/start", post(start_journey))
        .route("/journey/submit", post(submit_step))
        .route("/logout", post(logout))
        .route("/logout/cancel-redirect", post(cancel_redirect))
        .with_state(state);

    if let Some(key) = api_key {
        api_routes = api_routes.layer(middleware::from_fn_with_state(
            ApiKey(key.to_string()),
            auth_middleware,
        ));
    }

    Router::new().nest("/api", api_routes).layer(cors_layer())
}
