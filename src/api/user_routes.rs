//! User and fence handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::{ApiError, ApiResponse, AppState};
use crate::models::{CreateUserRequest, FenceRequest, User};

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<ApiResponse<String>>) {
    ApiResponse::ok("Service healthy", "OK".to_string())
}

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = body?;
    let new_user = request.validate()?;
    let user = state.users.insert_user(new_user).await?;
    Ok(ApiResponse::ok("Successfully created user", user))
}

pub async fn list_users_in_default_fence(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.fences.users_within_default_fence().await?;
    Ok(ApiResponse::ok("Successfully retrieved users", users))
}

pub async fn list_users_within_fence(
    State(state): State<AppState>,
    body: Result<Json<FenceRequest>, JsonRejection>,
) -> ApiResult<Vec<User>> {
    let Json(request) = body?;
    let (label, fence) = request.validate()?;
    let users = state.fences.users_within_fence(&label, &fence).await?;
    Ok(ApiResponse::ok("Successfully retrieved users", users))
}
