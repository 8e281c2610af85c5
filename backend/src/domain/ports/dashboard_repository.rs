//! Port for aggregate counts shown on the dashboard.
use async_trait::async_trait;

use crate::domain::{AssignmentStatus, UserStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by dashboard aggregate queries.
    pub enum DashboardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "dashboard repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "dashboard repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Number of users per status. Statuses without users may be omitted.
    async fn user_status_counts(&self) -> Result<Vec<(UserStatus, i64)>, DashboardRepositoryError>;

    /// Number of assignments per status. Statuses without rows may be omitted.
    async fn assignment_status_counts(
        &self,
    ) -> Result<Vec<(AssignmentStatus, i64)>, DashboardRepositoryError>;
}
