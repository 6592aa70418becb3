use axum::{
    Router,
    http::StatusCode,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    auth_request::{request_code, resend_code, verify_code},
    token::refresh_token,
    user::{get_me, update_me},
};
use crate::state::AppState;
use crate::telemetry::request_id_layer;

/// `GET /healthz` — liveness check.
async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — readiness check.
async fn readyz() -> StatusCode {
    StatusCode::OK
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth request lifecycle
        .route("/auth/mobile", post(request_code))
        .route("/auth/{id}/code", post(verify_code))
        .route("/auth/{id}/resend-code", post(resend_code))
        // Session tokens
        .route("/auth/refresh-token", post(refresh_token))
        // Profile
        .route("/users/me", get(get_me))
        .route("/users/me", patch(update_me))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
