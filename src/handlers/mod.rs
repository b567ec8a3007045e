// Handlers module
// HTTP handlers for the REST API

pub mod users;

use axum::{http::StatusCode, response::IntoResponse};

/// Liveness probe, always "OK" with 200
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
