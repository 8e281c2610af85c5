//! Port for set-based user status synchronisation.
use async_trait::async_trait;

use crate::domain::{StatusSyncOutcome, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while synchronising statuses.
    pub enum StatusSyncError {
        /// Repository connection could not be established.
        Connection { message: String } => "status sync connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "status sync query failed: {message}",
    }
}

/// Applies [`crate::domain::status_after_sync`] to stored users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSyncRepository: Send + Sync {
    /// Synchronise every user in one transaction.
    async fn sync_all(&self) -> Result<StatusSyncOutcome, StatusSyncError>;

    /// Synchronise only `user_ids`.
    async fn sync_users(&self, user_ids: &[UserId]) -> Result<StatusSyncOutcome, StatusSyncError>;
}
