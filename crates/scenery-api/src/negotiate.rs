//! Content negotiation for error responses.
//!
//! Browsers asking for HTML outside `/api/` get the 404 or error page.
//! Every other client gets the JSON body with the request path added.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};

use crate::error::ErrorInfo;
use crate::state::AppState;

/// Rewrite error responses produced by [`ApiError`](crate::ApiError).
///
/// Responses without an [`ErrorInfo`] extension pass through untouched.
pub async fn negotiate_errors(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let url = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), ToString::to_string);
    let html = wants_html(request.uri().path(), request.headers());

    let response = next.run(request).await;
    let Some(info) = response.extensions().get::<ErrorInfo>().cloned() else {
        return response;
    };

    if html {
        match state.views.error_page(info.status, &info.message, &url) {
            Ok(page) => return (info.status, Html(page)).into_response(),
            Err(e) => tracing::warn!(error = %e, "Error page render failed, sending JSON"),
        }
    }

    let body = serde_json::json!({
        "statusCode": info.status.as_u16(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "path": url,
        "message": info.message,
    });
    (info.status, axum::Json(body)).into_response()
}

/// HTML is chosen only for non-API paths whose `Accept` mentions `text/html`.
pub fn wants_html(path: &str, headers: &HeaderMap) -> bool {
    !path.starts_with("/api/")
        && headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("text/html"))
}
