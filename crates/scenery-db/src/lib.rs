//! Data layer for the Scenery backend (`PostgreSQL`, read/write split).
//!
//! Every mutation goes to the write pool; queries go to a second,
//! independently configured read pool that may point at a replica. Both
//! pools sit behind one lifecycle-managed facade, [`DataAccess`].
//!
//! # Architecture
//!
//! ```text
//! UserService
//!     |
//!     +-- create / update / delete --> DataAccess::write() --> write pool
//!     |
//!     +-- list / find / exists ------> DataAccess::read()  --> read pool
//! ```
//!
//! # Modules
//!
//! - [`config`] -- connection strings, TLS policy, read routing mode
//! - [`client`] -- one pool plus its connect/disconnect/close steps
//! - [`access`] -- the facade and its lifecycle
//! - [`recent`] -- recently written keys for read-your-writes routing
//! - [`user_store`] -- queries against the `users` table
//! - [`migrate`] -- embedded schema migrations
//! - [`error`] -- shared error types

pub mod access;
pub mod client;
pub mod config;
pub mod error;
pub mod migrate;
pub mod recent;
pub mod user_store;

// Re-export primary types for convenience.
pub use access::{DataAccess, Lifecycle, LiveConnections};
pub use client::{DbClient, PoolRole};
pub use config::{
    ConnectionConfig, DataAccessConfig, ReadConsistency, RuntimeMode, TlsPolicy, redact_url,
};
pub use error::DbError;
pub use migrate::{MigrationEntry, MigrationStatus};
pub use user_store::{UserRow, UserStore, user_key};
