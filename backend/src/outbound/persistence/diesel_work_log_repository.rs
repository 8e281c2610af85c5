//! PostgreSQL-backed `WorkLogRepository`.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::dsl::count;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{WorkLogFilter, WorkLogPersistenceError, WorkLogRepository};
use crate::domain::{AssignmentId, Hours, UserHours, UserId, WorkLog, WorkLogId};

use super::diesel_error_mapping::{collect_rows, map_basic_diesel_error, map_pool_error};
use super::models::{NewWorkLogRow, WorkLogRow};
use super::pool::DbPool;
use super::schema::{users, work_logs};

/// Diesel implementation of [`WorkLogRepository`].
#[derive(Clone)]
pub struct DieselWorkLogRepository {
    pool: DbPool,
}

impl DieselWorkLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> WorkLogPersistenceError {
    map_basic_diesel_error(
        error,
        WorkLogPersistenceError::query,
        WorkLogPersistenceError::connection,
    )
}

fn row_to_work_log(row: WorkLogRow) -> Result<WorkLog, String> {
    let hours = Hours::new(row.hours).map_err(|err| format!("work log {}: {err}", row.id))?;
    Ok(WorkLog {
        id: WorkLogId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        assignment_id: AssignmentId::from_uuid(row.assignment_id),
        work_date: row.work_date,
        hours,
        description: row.description,
    })
}

#[async_trait]
impl WorkLogRepository for DieselWorkLogRepository {
    async fn insert(&self, log: &WorkLog) -> Result<(), WorkLogPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, WorkLogPersistenceError::connection))?;

        let row = NewWorkLogRow {
            id: *log.id.as_uuid(),
            user_id: *log.user_id.as_uuid(),
            assignment_id: *log.assignment_id.as_uuid(),
            work_date: log.work_date,
            hours: log.hours.get(),
            description: log.description.as_deref(),
        };
        diesel::insert_into(work_logs::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self, filter: &WorkLogFilter) -> Result<Vec<WorkLog>, WorkLogPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, WorkLogPersistenceError::connection))?;

        let mut query = work_logs::table
            .select(WorkLogRow::as_select())
            .into_boxed();
        if let Some(user) = filter.user_id {
            query = query.filter(work_logs::user_id.eq(*user.as_uuid()));
        }
        if let Some(assignment) = filter.assignment_id {
            query = query.filter(work_logs::assignment_id.eq(*assignment.as_uuid()));
        }
        if let Some(from) = filter.from {
            query = query.filter(work_logs::work_date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(work_logs::work_date.le(to));
        }

        let rows: Vec<WorkLogRow> = query
            .order_by((work_logs::work_date.desc(), work_logs::created_at.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_work_log, WorkLogPersistenceError::query)
    }

    async fn delete(&self, id: &WorkLogId) -> Result<bool, WorkLogPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, WorkLogPersistenceError::connection))?;

        let deleted = diesel::delete(work_logs::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn hours_by_user(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<UserHours>, WorkLogPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, WorkLogPersistenceError::connection))?;

        let rows: Vec<(Uuid, String, Option<f64>, i64)> = work_logs::table
            .inner_join(users::table)
            .filter(work_logs::work_date.between(from, to))
            .group_by((users::id, users::full_name))
            .select((
                users::id,
                users::full_name,
                diesel::dsl::sum(work_logs::hours),
                count(work_logs::id),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, full_name, total, entries)| UserHours {
                user_id: UserId::from_uuid(id),
                full_name,
                total_hours: total.unwrap_or_default(),
                entries,
            })
            .collect())
    }

    async fn total_hours(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<f64, WorkLogPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, WorkLogPersistenceError::connection))?;

        let total: Option<f64> = work_logs::table
            .filter(work_logs::work_date.between(from, to))
            .select(diesel::dsl::sum(work_logs::hours))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(total.unwrap_or_default())
    }
}
