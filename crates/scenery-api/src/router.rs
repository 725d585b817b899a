//! Axum router construction.
//!
//! Assembles the page, user, and GitHub routes plus `/static` into a single
//! [`Router`]. CORS reflects the caller's origin and allows credentials.

use std::sync::Arc;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::negotiate::negotiate_errors;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- landing page
/// - `GET /user` -- user administration page
/// - `POST /user` -- create a user
/// - `GET /user/list` -- list users, newest first
/// - `GET /user/{id}` -- single user
/// - `PATCH /user/{id}` -- update a user
/// - `DELETE /user/{id}` -- delete a user
/// - `POST /getGithubAccountInfo` -- GitHub account lookup
/// - `GET /static/*` -- files from the public directory
///
/// Unmatched routes, unsupported methods on known routes, and missing
/// static files all answer 404 `Cannot {METHOD} {path}`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    let static_files = ServeDir::new(&state.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(handlers::not_found.into_service());

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route(
            "/user",
            get(handlers::user_page).post(handlers::create_user),
        )
        // Users
        .route("/user/list", get(handlers::list_users))
        .route(
            "/user/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // GitHub
        .route("/getGithubAccountInfo", post(handlers::github_account))
        .nest_service("/static", static_files)
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            negotiate_errors,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
