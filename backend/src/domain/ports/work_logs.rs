//! Driving port for work hour records.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{AssignmentId, Error, Hours, UserHours, UserId, WorkLog, WorkLogId};

use super::WorkLogFilter;

/// Input for logging hours.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkLog {
    pub user_id: UserId,
    pub assignment_id: AssignmentId,
    pub work_date: NaiveDate,
    pub hours: Hours,
    pub description: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkLogs: Send + Sync {
    /// The user must lead or belong to the assignment.
    async fn log_hours(&self, request: NewWorkLog) -> Result<WorkLog, Error>;

    async fn list_work_logs(&self, filter: WorkLogFilter) -> Result<Vec<WorkLog>, Error>;

    async fn delete_work_log(&self, id: WorkLogId) -> Result<(), Error>;

    /// Per-user totals ranked by hours, then name.
    async fn hours_by_user(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UserHours>, Error>;
}
