//! User management service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{NewUser, UserManagement, UserPersistenceError, UserRepository};
use crate::domain::{Error, User, UserId, UserPatch, UserStatus};

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Referenced { message } => {
            Error::conflict(format!("user is still referenced: {message}"))
        }
    }
}

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Service implementing [`UserManagement`].
#[derive(Clone)]
pub struct UserService<R> {
    user_repo: Arc<R>,
}

impl<R> UserService<R> {
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }
}

impl<R> UserService<R>
where
    R: UserRepository,
{
    async fn load(&self, id: UserId) -> Result<User, Error> {
        self.user_repo
            .find_by_id(&id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn store(&self, user: User) -> Result<User, Error> {
        let updated = self
            .user_repo
            .update(&user)
            .await
            .map_err(map_user_repository_error)?;
        if !updated {
            return Err(user_not_found(user.id()));
        }
        Ok(user)
    }
}

#[async_trait]
impl<R> UserManagement for UserService<R>
where
    R: UserRepository,
{
    async fn list_users(&self, status: Option<UserStatus>) -> Result<Vec<User>, Error> {
        self.user_repo
            .list(status)
            .await
            .map_err(map_user_repository_error)
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.load(id).await
    }

    async fn create_user(&self, request: NewUser) -> Result<User, Error> {
        let NewUser {
            full_name,
            role,
            phone,
        } = request;
        let user = User::new(UserId::random(), full_name, role, phone, UserStatus::Available);
        self.user_repo
            .insert(&user)
            .await
            .map_err(map_user_repository_error)?;
        info!(user_id = %user.id(), role = %user.role(), "user created");
        Ok(user)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error> {
        let user = self.load(id).await?.apply(patch);
        self.store(user).await
    }

    async fn set_user_status(&self, id: UserId, status: UserStatus) -> Result<User, Error> {
        let user = self.load(id).await?;
        let previous = user.status();
        let user = self.store(user.with_status(status)).await?;
        info!(user_id = %id, from = %previous, to = %status, "user status set manually");
        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let busy = self
            .user_repo
            .has_open_assignments(&id)
            .await
            .map_err(map_user_repository_error)?;
        if busy {
            return Err(Error::conflict(format!(
                "user {id} is on a planned or active assignment"
            )));
        }
        let deleted = self
            .user_repo
            .delete_with_history(&id)
            .await
            .map_err(map_user_repository_error)?;
        if !deleted {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
