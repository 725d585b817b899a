//! Error types for process startup.

use scenery_db::DbError;

/// Errors raised while loading [`AppConfig`](crate::config::AppConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Parser message.
        message: String,
    },

    /// The database settings are incomplete.
    #[error(transparent)]
    Database(#[from] DbError),
}
