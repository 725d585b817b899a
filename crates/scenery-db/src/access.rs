//! The read/write data access facade.
//!
//! [`DataAccess`] owns two independent [`DbClient`]s and is the single entry
//! point the rest of the application uses to reach the database:
//!
//! ```text
//!            DataAccess
//!     +----------+-----------+
//!     |                      |
//!  write() --> DbClient(Write) --> write pool --> primary
//!  read()  --> DbClient(Read)  --> read pool  --> replica (or primary)
//! ```
//!
//! # Lifecycle
//!
//! `Created --initialize()--> Ready --shutdown()--> Closed`
//!
//! A failed `initialize()` moves to `Failed` and closes both pools. The
//! accessors only hand out clients in `Ready`.
//!
//! # Consistency
//!
//! Reads and writes go to different pools with no staleness barrier. A
//! row written through [`DataAccess::write`] may be briefly invisible on
//! [`DataAccess::read`] while a replica catches up, and an existence check
//! on `read` followed by a mutation on `write` is not atomic. Callers that
//! need to observe their own writes can enable
//! [`ReadConsistency::ReadYourWrites`] and route through
//! [`DataAccess::read_for`].

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use crate::client::{DbClient, PoolRole};
use crate::config::{DataAccessConfig, ReadConsistency};
use crate::error::DbError;
use crate::recent::RecentWrites;

/// Lifecycle state of a [`DataAccess`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    /// Pools exist but nothing has connected yet.
    Created = 0,
    /// `initialize()` is running.
    Initializing = 1,
    /// Both pools connected; accessors are usable.
    Ready = 2,
    /// `initialize()` failed; both pools were closed.
    Failed = 3,
    /// `shutdown()` has run.
    Closed = 4,
}

impl Lifecycle {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Initializing,
            2 => Self::Ready,
            3 => Self::Failed,
            _ => Self::Closed,
        }
    }

    /// Lowercase name used in logs and errors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live connection counts of both pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveConnections {
    /// Connections held by the write pool.
    pub write: u32,
    /// Connections held by the read pool.
    pub read: u32,
}

impl LiveConnections {
    /// Whether both pools hold no connections.
    pub const fn is_zero(self) -> bool {
        self.write == 0 && self.read == 0
    }
}

/// Facade over the write and read pools.
///
/// Construct once at startup, wrap in an [`std::sync::Arc`] and pass it to
/// consumers. Nothing here is global.
pub struct DataAccess {
    write: DbClient,
    read: DbClient,
    state: AtomicU8,
    consistency: ReadConsistency,
    recent: Option<RecentWrites>,
    shutdown_timeout: Duration,
}

impl DataAccess {
    /// Build both clients from configuration. Opens no connections.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if either URL cannot be parsed.
    pub fn new(config: &DataAccessConfig) -> Result<Self, DbError> {
        let write = DbClient::new(PoolRole::Write, &config.write)?;
        let read = DbClient::new(PoolRole::Read, &config.read)?;

        let recent = match config.consistency {
            ReadConsistency::Eventual => None,
            ReadConsistency::ReadYourWrites { window } => Some(RecentWrites::new(window)),
        };

        tracing::debug!(
            write = %config.write.redacted_url(),
            read = %config.read.redacted_url(),
            shared_target = config.shares_target(),
            consistency = ?config.consistency,
            "Data access constructed"
        );

        Ok(Self {
            write,
            read,
            state: AtomicU8::new(Lifecycle::Created as u8),
            consistency: config.consistency,
            recent,
            shutdown_timeout: config.shutdown_timeout,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The configured read routing mode.
    pub const fn consistency(&self) -> ReadConsistency {
        self.consistency
    }

    /// Connect both pools, write first.
    ///
    /// May only be called once. On failure both pools are closed and the
    /// facade stays unusable; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidState`] if called outside `Created`, or
    /// [`DbError::Connect`] if either pool cannot reach its target.
    pub async fn initialize(&self) -> Result<(), DbError> {
        if let Err(current) = self.state.compare_exchange(
            Lifecycle::Created as u8,
            Lifecycle::Initializing as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return Err(DbError::InvalidState {
                operation: "initialize",
                state: Lifecycle::from_u8(current),
            });
        }

        for client in [&self.write, &self.read] {
            if let Err(e) = client.connect().await {
                tracing::error!(
                    role = %client.role(),
                    error = %e,
                    "Data access initialization failed"
                );
                self.abandon().await;
                return Err(e);
            }
        }

        // A shutdown that raced the connect wins.
        if self
            .state
            .compare_exchange(
                Lifecycle::Initializing as u8,
                Lifecycle::Ready as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(DbError::InvalidState {
                operation: "initialize",
                state: self.state(),
            });
        }

        tracing::info!(
            write = %self.write.config().redacted_url(),
            read = %self.read.config().redacted_url(),
            "Data access ready"
        );
        Ok(())
    }

    /// Close both pools after a failed initialization.
    ///
    /// If a concurrent `shutdown()` already moved the state on, it owns the
    /// teardown and this does nothing.
    async fn abandon(&self) {
        if self
            .state
            .compare_exchange(
                Lifecycle::Initializing as u8,
                Lifecycle::Failed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            tracing::debug!(state = %self.state(), "Initialization failed after shutdown began");
            return;
        }

        for client in [&self.write, &self.read] {
            client.disconnect();
            if let Err(e) = client.close(self.shutdown_timeout).await {
                tracing::warn!(
                    role = %client.role(),
                    error = %e,
                    "Pool close after failed initialization"
                );
            }
        }
    }

    /// Disconnect both clients, then close both pools.
    ///
    /// Every step runs even if an earlier one fails. Failures are logged and
    /// returned together; nothing is retried. Calling this again after it
    /// has run is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Shutdown`] listing each step that failed.
    pub async fn shutdown(&self) -> Result<(), DbError> {
        let previous =
            Lifecycle::from_u8(self.state.swap(Lifecycle::Closed as u8, Ordering::AcqRel));
        if previous == Lifecycle::Closed {
            tracing::debug!("Data access already shut down");
            return Ok(());
        }

        tracing::info!(from = %previous, "Shutting down data access");

        let clients = [&self.write, &self.read];

        for client in clients {
            if !client.disconnect() {
                tracing::debug!(role = %client.role(), "Client was not connected");
            }
        }

        let mut failures = Vec::new();
        for client in clients {
            if let Err(e) = client.close(self.shutdown_timeout).await {
                tracing::warn!(role = %client.role(), error = %e, "Pool did not close cleanly");
                failures.push(e);
            }
        }

        if failures.is_empty() {
            tracing::info!("Data access shut down");
            Ok(())
        } else {
            Err(DbError::Shutdown(failures))
        }
    }

    /// The client for mutations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotReady`] outside the `Ready` state.
    pub fn write(&self) -> Result<&DbClient, DbError> {
        self.ready(&self.write)
    }

    /// The client for queries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotReady`] outside the `Ready` state.
    pub fn read(&self) -> Result<&DbClient, DbError> {
        self.ready(&self.read)
    }

    /// The client to query `key` with, honoring read-your-writes.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotReady`] outside the `Ready` state.
    pub async fn read_for(&self, key: &str) -> Result<&DbClient, DbError> {
        match self.route_read(key).await {
            PoolRole::Write => self.write(),
            PoolRole::Read => self.read(),
        }
    }

    /// Which pool a read of `key` goes to right now.
    pub async fn route_read(&self, key: &str) -> PoolRole {
        match &self.recent {
            Some(recent) if recent.contains(key).await => PoolRole::Write,
            _ => PoolRole::Read,
        }
    }

    /// Note that `key` was just mutated. No-op in eventual mode.
    pub async fn record_write(&self, key: &str) {
        if let Some(recent) = &self.recent {
            recent.record(key).await;
        }
    }

    /// Current connection counts of both pools.
    pub fn live_connections(&self) -> LiveConnections {
        LiveConnections {
            write: self.write.live_connections(),
            read: self.read.live_connections(),
        }
    }

    /// The write pool's client, regardless of lifecycle state.
    ///
    /// For inspection only (targets, counts); use [`DataAccess::write`] to
    /// run queries.
    pub const fn write_client(&self) -> &DbClient {
        &self.write
    }

    /// The read pool's client, regardless of lifecycle state.
    ///
    /// For inspection only (targets, counts); use [`DataAccess::read`] to
    /// run queries.
    pub const fn read_client(&self) -> &DbClient {
        &self.read
    }

    fn ready<'a>(&self, client: &'a DbClient) -> Result<&'a DbClient, DbError> {
        let state = self.state();
        if state == Lifecycle::Ready && client.is_connected() {
            Ok(client)
        } else {
            Err(DbError::NotReady { state })
        }
    }
}

impl fmt::Debug for DataAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataAccess")
            .field("state", &self.state())
            .field("write", &self.write)
            .field("read", &self.read)
            .field("consistency", &self.consistency)
            .finish_non_exhaustive()
    }
}
