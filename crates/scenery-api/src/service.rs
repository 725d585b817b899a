//! User CRUD on top of the read/write facade.
//!
//! Mutations go through [`DataAccess::write`]; listing and lookups go
//! through the read side. `update` and `remove` first confirm the user
//! exists on the read side and then mutate on the write side. The two
//! calls are independent: a lagging replica can report a just-created
//! user as missing, and nothing makes the check and the mutation atomic.

use std::sync::Arc;

use scenery_db::{DataAccess, DbError, UserStore, user_key};
use scenery_types::{CreateUser, UpdateUser, User};

/// Errors surfaced by [`UserService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No user has this id.
    #[error("user {0} not found")]
    NotFound(i32),

    /// The data layer failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// CRUD operations for users.
#[derive(Debug, Clone)]
pub struct UserService {
    data: Arc<DataAccess>,
}

impl UserService {
    /// Create a service over the shared facade.
    pub const fn new(data: Arc<DataAccess>) -> Self {
        Self { data }
    }

    /// Create a user on the write pool.
    pub async fn create(&self, input: &CreateUser) -> Result<User, ServiceError> {
        let client = self.data.write()?;
        let user = UserStore::new(client.pool()).insert(input).await?;
        self.data.record_write(&user_key(user.id)).await;

        tracing::info!(id = user.id, "User created");
        Ok(user)
    }

    /// All users, newest first, from the read pool.
    pub async fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        let client = self.data.read()?;
        let users = UserStore::new(client.pool()).list_newest_first().await?;
        tracing::debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    /// One user from the read side.
    pub async fn find_one(&self, id: i32) -> Result<User, ServiceError> {
        let client = self.data.read_for(&user_key(id)).await?;
        UserStore::new(client.pool())
            .find(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Check existence on the read side, then update on the write pool.
    /// An empty patch returns the current row without writing.
    pub async fn update(&self, id: i32, changes: &UpdateUser) -> Result<User, ServiceError> {
        let current = self.find_one(id).await?;
        if changes.is_empty() {
            return Ok(current);
        }

        let client = self.data.write()?;
        let user = UserStore::new(client.pool())
            .update(id, changes)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        self.data.record_write(&user_key(id)).await;

        tracing::info!(id, "User updated");
        Ok(user)
    }

    /// Check existence on the read side, then delete on the write pool.
    pub async fn remove(&self, id: i32) -> Result<User, ServiceError> {
        self.find_one(id).await?;

        let client = self.data.write()?;
        let user = UserStore::new(client.pool())
            .delete(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        self.data.record_write(&user_key(id)).await;

        tracing::info!(id, "User deleted");
        Ok(user)
    }
}
