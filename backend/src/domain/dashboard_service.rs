//! Dashboard figures service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, FixedOffset, Months, NaiveDate};
use mockable::Clock;

use crate::domain::ports::{
    DEFAULT_TOP_WORKERS, Dashboard, DashboardRepository, DashboardRepositoryError, DashboardStats,
    MAX_TOP_WORKERS, StatusCount, WorkLogRepository,
};
use crate::domain::work_log_service::{check_range, map_work_log_repository_error};
use crate::domain::{AssignmentStatus, Error, UserHours, UserStatus, rank_user_hours};

fn map_dashboard_error(error: DashboardRepositoryError) -> Error {
    match error {
        DashboardRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("dashboard repository unavailable: {message}"))
        }
        DashboardRepositoryError::Query { message } => {
            Error::internal(format!("dashboard repository error: {message}"))
        }
    }
}

/// Fill in zero counts so every status is reported, in declaration order.
fn complete_counts<S, const N: usize>(all: [S; N], rows: &[(S, i64)]) -> Vec<StatusCount<S>>
where
    S: Copy + PartialEq,
{
    all.into_iter()
        .map(|status| StatusCount {
            status,
            count: rows
                .iter()
                .filter(|(row_status, _)| *row_status == status)
                .map(|(_, count)| *count)
                .sum(),
        })
        .collect()
}

/// Clamp a requested top-workers limit.
pub fn clamp_limit(limit: Option<u32>) -> usize {
    let clamped = limit
        .unwrap_or(DEFAULT_TOP_WORKERS)
        .clamp(1, MAX_TOP_WORKERS);
    usize::try_from(clamped).unwrap_or(usize::MAX)
}

/// First and last day of the calendar month containing `day`.
fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = day.with_day(1).unwrap_or(day);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day);
    (start, end)
}

/// Service implementing [`Dashboard`].
#[derive(Clone)]
pub struct DashboardService<D, W> {
    dashboard_repo: Arc<D>,
    work_log_repo: Arc<W>,
    clock: Arc<dyn Clock>,
    local_offset: FixedOffset,
}

impl<D, W> DashboardService<D, W> {
    pub fn new(
        dashboard_repo: Arc<D>,
        work_log_repo: Arc<W>,
        clock: Arc<dyn Clock>,
        local_offset: FixedOffset,
    ) -> Self {
        Self {
            dashboard_repo,
            work_log_repo,
            clock,
            local_offset,
        }
    }

    fn today(&self) -> NaiveDate {
        self.clock
            .utc()
            .with_timezone(&self.local_offset)
            .date_naive()
    }
}

#[async_trait]
impl<D, W> Dashboard for DashboardService<D, W>
where
    D: DashboardRepository,
    W: WorkLogRepository,
{
    async fn stats(&self) -> Result<DashboardStats, Error> {
        let (month_start, month_end) = month_bounds(self.today());

        let users = self
            .dashboard_repo
            .user_status_counts()
            .await
            .map_err(map_dashboard_error)?;
        let assignments = self
            .dashboard_repo
            .assignment_status_counts()
            .await
            .map_err(map_dashboard_error)?;
        let hours_this_month = self
            .work_log_repo
            .total_hours(month_start, month_end)
            .await
            .map_err(map_work_log_repository_error)?;

        Ok(DashboardStats {
            users: complete_counts(UserStatus::ALL, &users),
            assignments: complete_counts(AssignmentStatus::ALL, &assignments),
            month_start,
            hours_this_month,
        })
    }

    async fn top_workers(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: Option<u32>,
    ) -> Result<Vec<UserHours>, Error> {
        check_range(from, to)?;
        let mut rows = self
            .work_log_repo
            .hours_by_user(from, to)
            .await
            .map_err(map_work_log_repository_error)?;
        rank_user_hours(&mut rows);
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }
}
