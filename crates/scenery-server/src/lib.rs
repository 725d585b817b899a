//! Process wiring for the Scenery backend.
//!
//! Shared by the two binaries:
//!
//! - `scenery-server` -- connects the write and read pools, serves HTTP,
//!   and drains both pools on shutdown
//! - `scenery-migrate` -- applies, inspects, or resets the schema on the
//!   write database
//!
//! # Modules
//!
//! - [`config`] -- [`AppConfig`] from environment variables
//! - [`telemetry`] -- tracing subscriber setup
//! - [`error`] -- configuration errors

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, LogFormat};
pub use error::ConfigError;
