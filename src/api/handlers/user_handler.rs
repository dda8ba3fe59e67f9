//! User handlers.
//!
//! Thin adapters: extract the path segment and body, call the directory,
//! shape the JSON response. Errors render through
//! [`AppError`](crate::errors::AppError).

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::MESSAGE_USER_DELETED;
use crate::domain::{UserPayload, UserProfile};
use crate::errors::AppResult;
use crate::types::{CreatedResponse, ListResponse, StatusMessage};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(fetch_any_user).post(create_user))
        .route(
            "/users/:username",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Fetch one arbitrary live user
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "Some live user, or null when the directory is empty", body = ListResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn fetch_any_user(State(state): State<AppState>) -> AppResult<Json<ListResponse>> {
    let user = state.user_service.fetch_any().await?;
    Ok(Json(ListResponse::from(user)))
}

/// Get user by username
#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User profile", body = UserProfile),
        (status = 404, description = "User not found"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let user = state.user_service.fetch_by_username(&username).await?;
    Ok(Json(UserProfile::from(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 200, description = "User created", body = CreatedResponse),
        (status = 400, description = "Missing or empty field"),
        (status = 409, description = "Username or email already in use"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> AppResult<Json<CreatedResponse>> {
    let user = state.user_service.create_user(payload).await?;
    Ok(Json(CreatedResponse::from(user)))
}

/// Replace email and names of an existing user
#[utoipa::path(
    put,
    path = "/users/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = UserProfile),
        (status = 400, description = "Missing or empty field"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> AppResult<Json<UserProfile>> {
    let user = state.user_service.update_user(&username, payload).await?;
    Ok(Json(UserProfile::from(user)))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/users/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User deleted", body = StatusMessage),
        (status = 404, description = "User not found"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<StatusMessage>> {
    state.user_service.delete_user(&username).await?;
    Ok(Json(StatusMessage::new(MESSAGE_USER_DELETED)))
}
