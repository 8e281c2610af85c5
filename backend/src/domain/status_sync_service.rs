//! Status synchronisation service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::assignment_service::map_status_sync_error;
use crate::domain::ports::{StatusSync, StatusSyncRepository};
use crate::domain::{Error, StatusSyncOutcome, UserId};

/// Service implementing [`StatusSync`].
#[derive(Clone)]
pub struct StatusSyncService<R> {
    repo: Arc<R>,
}

impl<R> StatusSyncService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> StatusSync for StatusSyncService<R>
where
    R: StatusSyncRepository,
{
    async fn sync_all_statuses(&self) -> Result<StatusSyncOutcome, Error> {
        let outcome = self.repo.sync_all().await.map_err(map_status_sync_error)?;
        info!(
            promoted = outcome.promoted,
            released = outcome.released,
            "all user statuses synchronised"
        );
        Ok(outcome)
    }

    async fn sync_statuses_for(&self, user_ids: Vec<UserId>) -> Result<StatusSyncOutcome, Error> {
        if user_ids.is_empty() {
            return Ok(StatusSyncOutcome::default());
        }
        self.repo
            .sync_users(&user_ids)
            .await
            .map_err(map_status_sync_error)
    }
}
