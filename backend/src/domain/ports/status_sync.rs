//! Driving port for user status synchronisation.

use async_trait::async_trait;

use crate::domain::{Error, StatusSyncOutcome, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSync: Send + Sync {
    async fn sync_all_statuses(&self) -> Result<StatusSyncOutcome, Error>;

    async fn sync_statuses_for(&self, user_ids: Vec<UserId>) -> Result<StatusSyncOutcome, Error>;
}
