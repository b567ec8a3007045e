use axum::{routing::get, Router};
use std::time::Duration;

use crate::{
    handlers::{
        health_check,
        users::{create_user, list_users},
    },
    middleware::apply_middleware,
    store::SharedUserStore,
};

/// Builds the application router over an already-constructed store.
pub fn create_router(store: SharedUserStore, request_timeout: Duration) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/users", get(list_users).post(create_user))
        .with_state(store);

    apply_middleware(router, request_timeout)
}
