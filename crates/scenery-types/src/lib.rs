//! Shared type definitions for the Scenery user-management backend.
//!
//! These types cross crate boundaries: the data layer maps rows into
//! [`User`], and the HTTP layer deserializes request bodies into
//! [`CreateUser`] / [`UpdateUser`] and validates them before anything
//! touches the database.

pub mod user;

pub use user::{AGE_MAX, CreateUser, UpdateUser, User, describe_validation};
