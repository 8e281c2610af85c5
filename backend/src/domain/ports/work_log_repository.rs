//! Port abstraction for work log persistence.
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AssignmentId, UserHours, UserId, WorkLog, WorkLogId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by work log repository adapters.
    pub enum WorkLogPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "work log repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "work log repository query failed: {message}",
    }
}

/// Listing filter; all bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkLogFilter {
    pub user_id: Option<UserId>,
    pub assignment_id: Option<AssignmentId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkLogRepository: Send + Sync {
    async fn insert(&self, log: &WorkLog) -> Result<(), WorkLogPersistenceError>;

    /// Entries matching `filter`, newest work date first.
    async fn list(&self, filter: &WorkLogFilter) -> Result<Vec<WorkLog>, WorkLogPersistenceError>;

    /// Returns `false` when the entry did not exist.
    async fn delete(&self, id: &WorkLogId) -> Result<bool, WorkLogPersistenceError>;

    /// Per-user totals for work dates in `[from, to]`.
    async fn hours_by_user(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<UserHours>, WorkLogPersistenceError>;

    /// Sum of all hours for work dates in `[from, to]`.
    async fn total_hours(&self, from: NaiveDate, to: NaiveDate)
    -> Result<f64, WorkLogPersistenceError>;
}
