//! Port abstraction for assignment persistence.
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Assignment, AssignmentId, AssignmentStatus, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by assignment repository adapters.
    pub enum AssignmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "assignment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "assignment repository query failed: {message}",
    }
}

/// Listing filter. Dates select assignments whose `[start, end]` span
/// overlaps `[from, to]`; an open end date counts as the start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub status: Option<AssignmentStatus>,
    pub user_id: Option<UserId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AssignmentFilter {
    /// In-memory equivalent of the adapter's query.
    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.status.is_none_or(|status| assignment.status() == status)
            && self.user_id.is_none_or(|user| assignment.involves(user))
            && self.from.is_none_or(|from| assignment.last_day() >= from)
            && self.to.is_none_or(|to| assignment.start_date() <= to)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// List assignments matching `filter`, newest start date first.
    async fn list(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, AssignmentPersistenceError>;

    /// Fetch an assignment with its members.
    async fn find_by_id(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Assignment>, AssignmentPersistenceError>;

    /// Insert the assignment and its members in one transaction.
    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentPersistenceError>;

    /// Replace the row and its member set in one transaction. Returns `false`
    /// when the assignment is gone.
    async fn update(&self, assignment: &Assignment) -> Result<bool, AssignmentPersistenceError>;

    /// Delete work logs, members and the assignment in one transaction.
    /// Returns the former team, or `None` when nothing was deleted.
    async fn delete(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Vec<UserId>>, AssignmentPersistenceError>;
}
