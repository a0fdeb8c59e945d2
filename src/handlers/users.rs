use crate::handlers::common::{created_response, map_service_error, success_response};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, services::users::CreateUserInput, AppState,
};
use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Creates the router for user endpoints
pub fn users_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_user))
        .route("/me/vip", get(my_vip_status))
        .route("/vip", get(list_vip_users))
}

/// Register a user profile
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let input = CreateUserInput {
        email: payload.email,
        display_name: payload.display_name,
    };

    let profile = state
        .services
        .users
        .create_user(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(profile))
}

/// The caller's profile, including VIP status and effective dates
async fn my_vip_status(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let profile = state
        .services
        .users
        .get_profile(user.0)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(profile))
}

/// All current VIP users
async fn list_vip_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let users = state
        .services
        .users
        .list_vip_users()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(users))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email: String,
    display_name: String,
}
