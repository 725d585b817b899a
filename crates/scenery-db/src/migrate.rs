//! Schema migrations.
//!
//! Migrations are embedded from `migrations/` at compile time and always
//! run against the write pool.

use serde::Serialize;
use sqlx::migrate::{Migrate, Migrator};
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;

/// The embedded migration set.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// One migration as reported by [`status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationEntry {
    /// Version prefix from the file name.
    pub version: i64,
    /// Description from the file name.
    pub description: String,
}

/// Applied and pending migrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Migrations recorded in the database.
    pub applied: Vec<MigrationEntry>,
    /// Embedded migrations not yet applied.
    pub pending: Vec<MigrationEntry>,
}

/// Apply all pending migrations and report the resulting status.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if any migration fails.
pub async fn deploy(pool: &PgPool) -> Result<MigrationStatus, DbError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations completed");
    status(pool).await
}

/// Compare the embedded migrations with the ones recorded in the database.
///
/// # Errors
///
/// Returns [`DbError`] if the migrations table cannot be read.
pub async fn status(pool: &PgPool) -> Result<MigrationStatus, DbError> {
    let mut conn = pool.acquire().await?;
    let conn: &mut PgConnection = &mut conn;
    conn.ensure_migrations_table().await?;
    let applied_versions: Vec<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    let mut report = MigrationStatus::default();
    for migration in MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
    {
        let entry = MigrationEntry {
            version: migration.version,
            description: migration.description.to_string(),
        };
        if applied_versions.contains(&migration.version) {
            report.applied.push(entry);
        } else {
            report.pending.push(entry);
        }
    }
    Ok(report)
}

/// Drop and recreate the `public` schema, then apply every migration.
///
/// Destroys all data.
///
/// # Errors
///
/// Returns [`DbError`] if the schema cannot be dropped or a migration fails.
pub async fn reset(pool: &PgPool) -> Result<MigrationStatus, DbError> {
    tracing::warn!("Resetting database schema");
    sqlx::raw_sql("DROP SCHEMA public CASCADE; CREATE SCHEMA public;")
        .execute(pool)
        .await?;
    deploy(pool).await
}
