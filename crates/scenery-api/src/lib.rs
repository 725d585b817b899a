//! HTTP API for the Scenery user-management backend.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **User REST endpoints** (`/user`, `/user/list`, `/user/{id}`) backed
//!   by the read/write split in `scenery-db`
//! - **HTML pages** (`GET /`, `GET /user`) rendered from embedded
//!   templates, plus static assets under `/static`
//! - **GitHub account lookup** (`POST /getGithubAccountInfo`)
//!
//! # Architecture
//!
//! Handlers share one [`AppState`] holding the data facade. Mutations go to
//! the write pool and queries to the read pool; see
//! [`service::UserService`]. Errors are JSON by default and become HTML
//! pages for browsers; see [`negotiate`].

pub mod error;
pub mod github;
pub mod handlers;
pub mod negotiate;
pub mod router;
pub mod server;
pub mod service;
pub mod state;
pub mod views;

// Re-export primary types for convenience.
pub use error::{ApiError, ErrorInfo};
pub use github::GithubClient;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, shutdown_signal, start_server};
pub use service::{ServiceError, UserService};
pub use state::AppState;
pub use views::Views;
