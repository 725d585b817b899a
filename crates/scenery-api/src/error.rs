//! Error types for the HTTP layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. The
//! response carries an [`ErrorInfo`] extension so
//! [`crate::negotiate::negotiate_errors`] can re-render it as an HTML page
//! or add the request path to the JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scenery_db::DbError;

use crate::service::ServiceError;

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was malformed or failed validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request conflicts with existing data.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The database is not accepting work.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An upstream HTTP API returned an error.
    #[error("upstream error ({status}): {message}")]
    Upstream {
        /// Status to forward to the caller.
        status: StatusCode,
        /// Message from the upstream response.
        message: String,
    },

    /// A template failed to load or render.
    #[error("template error: {0}")]
    Template(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Status and message of an error response, attached as a response
/// extension.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
}

impl ApiError {
    /// The HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { status, .. } => *status,
            Self::Template(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to clients. Internal details are not exposed.
    pub fn client_message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::Unavailable(msg) => msg.clone(),
            Self::Upstream { message, .. } => message.clone(),
            Self::Template(_) | Self::Internal(_) => String::from("Internal Server Error"),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotReady { .. } | DbError::InvalidState { .. } => {
                Self::Unavailable(String::from("database is not available"))
            }
            other if other.is_unique_violation() => {
                Self::Conflict(String::from("a user with this email already exists"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => Self::NotFound(format!("User with ID {id} not found")),
            ServiceError::Db(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.client_message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "message": message,
        });

        let mut response = (status, axum::Json(body)).into_response();
        response
            .extensions_mut()
            .insert(ErrorInfo { status, message });
        response
    }
}
