//! Driving port for team member management.

use async_trait::async_trait;

use crate::domain::{Error, FullName, PhoneNumber, User, UserId, UserPatch, UserRole, UserStatus};

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: FullName,
    pub role: UserRole,
    pub phone: Option<PhoneNumber>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserManagement: Send + Sync {
    async fn list_users(&self, status: Option<UserStatus>) -> Result<Vec<User>, Error>;

    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// New users start as [`UserStatus::Available`].
    async fn create_user(&self, request: NewUser) -> Result<User, Error>;

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error>;

    /// Manual availability override.
    async fn set_user_status(&self, id: UserId, status: UserStatus) -> Result<User, Error>;

    /// Refused with a conflict while the user is on an open assignment.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
