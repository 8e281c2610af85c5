//! PostgreSQL-backed dashboard counters.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DashboardRepository, DashboardRepositoryError};
use crate::domain::{AssignmentStatus, UserStatus};

use super::diesel_error_mapping::{collect_rows, map_basic_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::{assignments, users};

/// Diesel implementation of [`DashboardRepository`].
#[derive(Clone)]
pub struct DieselDashboardRepository {
    pool: DbPool,
}

impl DieselDashboardRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DashboardRepositoryError {
    map_basic_diesel_error(
        error,
        DashboardRepositoryError::query,
        DashboardRepositoryError::connection,
    )
}

fn parse_counts<S>(rows: Vec<(String, i64)>) -> Result<Vec<(S, i64)>, DashboardRepositoryError>
where
    S: std::str::FromStr,
    S::Err: std::fmt::Display,
{
    collect_rows(
        rows,
        |(status, total)| {
            status
                .parse::<S>()
                .map(|parsed| (parsed, total))
                .map_err(|err| err.to_string())
        },
        DashboardRepositoryError::query,
    )
}

#[async_trait]
impl DashboardRepository for DieselDashboardRepository {
    async fn user_status_counts(&self) -> Result<Vec<(UserStatus, i64)>, DashboardRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DashboardRepositoryError::connection))?;

        let rows: Vec<(String, i64)> = users::table
            .group_by(users::status)
            .select((users::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        parse_counts(rows)
    }

    async fn assignment_status_counts(
        &self,
    ) -> Result<Vec<(AssignmentStatus, i64)>, DashboardRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, DashboardRepositoryError::connection))?;

        let rows: Vec<(String, i64)> = assignments::table
            .group_by(assignments::status)
            .select((assignments::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        parse_counts(rows)
    }
}
