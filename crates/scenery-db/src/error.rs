//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`sqlx`] errors with context about which pool or lifecycle step failed.

use std::time::Duration;

use crate::access::Lifecycle;
use crate::client::PoolRole;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` query failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A configuration error (missing or unparseable connection string).
    #[error("configuration error: {0}")]
    Config(String),

    /// A pool could not reach its target during initialization.
    #[error("{role} pool failed to connect to {target}: {source}")]
    Connect {
        /// Which pool failed.
        role: PoolRole,
        /// Redacted connection URL.
        target: String,
        /// The underlying driver error.
        source: sqlx::Error,
    },

    /// An accessor was used outside the initialized window.
    #[error("data access is not ready (state: {state})")]
    NotReady {
        /// The lifecycle state at the time of the call.
        state: Lifecycle,
    },

    /// A lifecycle operation was called in a state that does not allow it.
    #[error("cannot {operation} data access in state {state}")]
    InvalidState {
        /// The operation that was refused.
        operation: &'static str,
        /// The lifecycle state at the time of the call.
        state: Lifecycle,
    },

    /// Draining a pool did not finish within the shutdown timeout.
    #[error("{role} pool did not close within {timeout:?}")]
    ShutdownTimeout {
        /// Which pool timed out.
        role: PoolRole,
        /// The configured shutdown timeout.
        timeout: Duration,
    },

    /// One or more shutdown steps failed. Every step was still attempted.
    #[error("shutdown finished with {} error(s): {}", .0.len(), join_errors(.0))]
    Shutdown(Vec<DbError>),
}

impl DbError {
    /// Whether the error is a unique-constraint violation reported by the store.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Postgres(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

fn join_errors(errors: &[DbError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
