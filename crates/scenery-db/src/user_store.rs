//! Operations on the `users` table.
//!
//! The store is bound to whichever pool the caller hands it; it does not
//! choose between read and write. Routing is the caller's job via
//! [`crate::DataAccess`].

use chrono::{DateTime, Utc};
use scenery_types::{CreateUser, UpdateUser, User};
use sqlx::PgPool;

use crate::error::DbError;

/// Columns selected for every user query.
const USER_COLUMNS: &str = "id, nickname, email, age, created_at, updated_at";

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Serial primary key.
    pub id: i32,
    /// Display name.
    pub nickname: String,
    /// Unique email.
    pub email: String,
    /// Optional age.
    pub age: Option<i32>,
    /// Insert time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            nickname: row.nickname,
            email: row.email,
            age: row.age,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Cache key used for read-your-writes routing of a single user.
pub fn user_key(id: i32) -> String {
    format!("user:{id}")
}

/// Operations on the `users` table.
pub struct UserStore<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStore<'a> {
    /// Create a new user store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, including unique
    /// violations on `email`.
    pub async fn insert(&self, user: &CreateUser) -> Result<User, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (nickname, email, age) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(user.age)
        .fetch_one(self.pool)
        .await?;

        tracing::debug!(id = row.id, "Inserted user");
        Ok(row.into())
    }

    /// All users, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_newest_first(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// One user by id, or `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn find(&self, id: i32) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Apply the present fields of `changes`. An explicit `null` age sets the
    /// column to `NULL`. Returns `None` if no row has this id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update(&self, id: i32, changes: &UpdateUser) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"UPDATE users
              SET nickname = COALESCE($2, nickname),
                  email = COALESCE($3, email),
                  age = CASE WHEN $5 THEN $4 ELSE age END,
                  updated_at = now()
              WHERE id = $1
              RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.nickname.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.age.flatten())
        .bind(changes.age.is_some())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Delete a user and return the removed row, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete(&self, id: i32) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
