//! HTTP handlers.
//!
//! Each handler extracts the shared [`AppState`], checks its input and
//! delegates to [`UserService`](crate::service::UserService),
//! [`Views`](crate::views::Views) or
//! [`GithubClient`](crate::github::GithubClient).

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{OriginalUri, Path, State};
use axum::http::{Method, StatusCode};
use axum::response::Html;
use scenery_types::{CreateUser, UpdateUser, User, describe_validation};
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

/// Message for a non-numeric `:id` path segment.
pub const INVALID_ID: &str = "Validation failed (numeric string is expected)";

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// `GET /` -- landing page.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    state.views.index().map(Html)
}

/// `GET /user` -- user administration page.
pub async fn user_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    state.views.user_page().map(Html)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// `POST /user` -- create a user.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let input = validated(json_body(payload)?.normalized())?;
    let user = state.users.create(&input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /user/list` -- all users, newest first.
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.find_all().await?))
}

/// `GET /user/{id}` -- one user.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(id)?;
    Ok(Json(state.users.find_one(id).await?))
}

/// `PATCH /user/{id}` -- partial update.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(id)?;
    let changes = validated(json_body(payload)?.normalized())?;
    Ok(Json(state.users.update(id, &changes).await?))
}

/// `DELETE /user/{id}` -- delete and return the removed user.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(id)?;
    Ok(Json(state.users.remove(id).await?))
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// `POST /getGithubAccountInfo` -- the account behind `GITHUB_TOKEN`.
pub async fn github_account(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(state.github.account_info().await?))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Any unmatched route, method, or static file. Reports the path as the
/// client sent it, before any nesting strips a prefix.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Cannot {method} {}", uri.path()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|_rejected| ApiError::BadRequest(INVALID_ID.to_owned()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn validated<T: Validate>(input: T) -> Result<T, ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::BadRequest(describe_validation(&e)))?;
    Ok(input)
}
