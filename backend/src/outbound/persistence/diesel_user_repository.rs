//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AssignmentStatus, FullName, PhoneNumber, User, UserId, UserRole, UserStatus};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error, collect_rows, map_pool_error};
use super::models::{UserRecord, UserRow};
use super::pool::DbPool;
use super::schema::{assignment_members, assignments, users, work_logs};

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::ForeignKey(message) => UserPersistenceError::referenced(message),
        DieselFailure::Query(message) | DieselFailure::Unique(message) => {
            UserPersistenceError::query(message)
        }
    }
}

fn row_to_user(row: UserRow) -> Result<User, String> {
    let full_name = FullName::new(row.full_name).map_err(|err| err.to_string())?;
    let role = row
        .role
        .parse::<UserRole>()
        .map_err(|err| err.to_string())?;
    let status = row
        .status
        .parse::<UserStatus>()
        .map_err(|err| err.to_string())?;
    let phone = row
        .phone
        .map(PhoneNumber::new)
        .transpose()
        .map_err(|err| err.to_string())?;
    Ok(User::new(
        UserId::from_uuid(row.id),
        full_name,
        role,
        phone,
        status,
    ))
}

fn user_record(user: &User) -> UserRecord<'_> {
    UserRecord {
        id: *user.id().as_uuid(),
        full_name: user.full_name().as_ref(),
        role: user.role().as_str(),
        phone: user.phone().map(|phone| phone.as_ref()),
        status: user.status().as_str(),
    }
}

fn open_statuses() -> [&'static str; 2] {
    [
        AssignmentStatus::Planned.as_str(),
        AssignmentStatus::Active.as_str(),
    ]
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if let Some(status) = status {
            query = query.filter(users::status.eq(status.as_str()));
        }
        let rows: Vec<UserRow> = query
            .order_by((users::full_name, users::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_user, UserPersistenceError::query)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user)
            .transpose()
            .map_err(UserPersistenceError::query)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(&uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_user, UserPersistenceError::query)
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        diesel::insert_into(users::table)
            .values(&user_record(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let updated = diesel::update(users::table.find(user.id().as_uuid()))
            .set(&user_record(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn has_open_assignments(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let user = *id.as_uuid();
        let member_of = assignment_members::table
            .filter(assignment_members::user_id.eq(user))
            .select(assignment_members::assignment_id);
        let open = diesel::select(diesel::dsl::exists(
            assignments::table
                .filter(assignments::status.eq_any(open_statuses()))
                .filter(
                    assignments::team_lead_id
                        .eq(user)
                        .or(assignments::id.eq_any(member_of)),
                ),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(open)
    }

    async fn delete_with_history(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let user = *id.as_uuid();
        conn.transaction(|conn| {
            async move {
                diesel::delete(work_logs::table.filter(work_logs::user_id.eq(user)))
                    .execute(conn)
                    .await?;
                diesel::delete(
                    assignment_members::table.filter(assignment_members::user_id.eq(user)),
                )
                .execute(conn)
                .await?;
                let deleted = diesel::delete(users::table.find(user)).execute(conn).await?;
                Ok::<_, diesel::result::Error>(deleted > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(role: &str, status: &str, phone: Option<&str>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            full_name: "  Ioana Pop ".into(),
            role: role.into(),
            phone: phone.map(str::to_owned),
            status: status.into(),
        }
    }

    #[rstest]
    fn valid_rows_become_users() {
        let user = row_to_user(row("team_lead", "on_leave", Some("+40 721 000 111")))
            .expect("valid row");
        assert_eq!(user.full_name().as_ref(), "Ioana Pop");
        assert_eq!(user.role(), UserRole::TeamLead);
        assert_eq!(user.status(), UserStatus::OnLeave);
        assert!(user.phone().is_some());
    }

    #[rstest]
    #[case(row("pilot", "available", None))]
    #[case(row("driver", "asleep", None))]
    #[case(row("driver", "available", Some("call me")))]
    fn corrupt_rows_are_reported(#[case] bad: UserRow) {
        assert!(row_to_user(bad).is_err());
    }

    #[rstest]
    fn foreign_key_violations_mean_the_user_is_referenced() {
        let error = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            Box::new("violates foreign key constraint".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            UserPersistenceError::Referenced { .. }
        ));
    }

    #[rstest]
    fn records_borrow_domain_values() {
        let user = row_to_user(row("driver", "available", None)).expect("valid row");
        let record = user_record(&user);
        assert_eq!(record.role, "driver");
        assert_eq!(record.status, "available");
        assert_eq!(record.phone, None);
    }
}
