//! Driving port for dashboard figures.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AssignmentStatus, Error, UserHours, UserStatus};

/// Default number of top workers returned.
pub const DEFAULT_TOP_WORKERS: u32 = 5;
/// Upper bound on top workers returned.
pub const MAX_TOP_WORKERS: u32 = 50;

/// Count for one status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount<S> {
    pub status: S,
    pub count: i64,
}

/// Headline figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub users: Vec<StatusCount<UserStatus>>,
    pub assignments: Vec<StatusCount<AssignmentStatus>>,
    pub month_start: NaiveDate,
    pub hours_this_month: f64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dashboard: Send + Sync {
    /// Counts per status (every status listed, zero included) and hours
    /// logged in the current calendar month.
    async fn stats(&self) -> Result<DashboardStats, Error>;

    /// Users with the most hours in `[from, to]`. `limit` defaults to
    /// [`DEFAULT_TOP_WORKERS`] and is clamped to `1..=MAX_TOP_WORKERS`.
    async fn top_workers(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: Option<u32>,
    ) -> Result<Vec<UserHours>, Error>;
}
