// User handlers
// HTTP handlers for the users collection

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use crate::{error::{ApiError, ApiResult}, models::user::CreateUserRequest, store::SharedUserStore};

/// List every user
/// GET /api/users
///
/// No filter or pagination; the store decides the order (oldest first).
/// Store failures surface as the mapped `ApiError` response.
pub async fn list_users(State(store): State<SharedUserStore>) -> ApiResult<impl IntoResponse> {
    info!("Fetching all users");

    let users = store.find_all_users().await?;

    info!("Retrieved {} users", users.len());
    Ok((StatusCode::OK, Json(users)))
}

/// Create a user from a JSON body
/// POST /api/users
///
/// The body is taken as `Result<Json<_>, JsonRejection>` so an empty or
/// malformed body answers with the JSON error shape instead of axum's
/// plain-text rejection. The request is validated and normalized before it
/// reaches the store; the stored record, with its generated id, is returned.
pub async fn create_user(
    State(store): State<SharedUserStore>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    info!("Creating new user with email: {}", request.email);

    request.validate().map_err(ApiError::Validation)?;
    let user = store.create_user(request.into_user()).await?;

    info!("Successfully created user with id: {}", user.id);
    Ok((StatusCode::OK, Json(user)))
}
