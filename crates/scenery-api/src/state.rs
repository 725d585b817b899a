//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use scenery_db::DataAccess;

use crate::error::ApiError;
use crate::github::GithubClient;
use crate::service::UserService;
use crate::views::Views;

/// State handed to every handler behind an [`Arc`].
#[derive(Debug)]
pub struct AppState {
    /// The read/write data facade. Owned by the process, shut down after
    /// the server stops.
    pub data: Arc<DataAccess>,
    /// User CRUD.
    pub users: UserService,
    /// Page templates.
    pub views: Views,
    /// GitHub account lookup.
    pub github: GithubClient,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Assemble the state. Loads the page templates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Template`] if a template fails to parse.
    pub fn new(
        data: Arc<DataAccess>,
        github: GithubClient,
        static_dir: impl Into<PathBuf>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            users: UserService::new(Arc::clone(&data)),
            data,
            views: Views::new()?,
            github,
            static_dir: static_dir.into(),
        })
    }
}
