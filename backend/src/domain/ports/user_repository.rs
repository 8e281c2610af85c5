//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserId, UserStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Other records still point at the user.
        Referenced { message: String } => "user is still referenced: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users ordered by name, optionally restricted to one status.
    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the users among `ids` that exist.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Persist profile fields and status. Returns `false` when the user is gone.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Whether the user leads or belongs to a planned or active assignment.
    async fn has_open_assignments(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Delete the user with their work logs and memberships in one
    /// transaction. Returns `false` when the user did not exist.
    async fn delete_with_history(&self, id: &UserId) -> Result<bool, UserPersistenceError>;
}
