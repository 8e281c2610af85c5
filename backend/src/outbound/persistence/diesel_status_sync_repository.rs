//! Set-based user status synchronisation.
//!
//! Both statements run in one transaction so a concurrent assignment change
//! cannot leave a user half-synchronised. `$1` optionally scopes the update
//! to a list of user ids; `NULL` means every user.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{Array, Nullable, Uuid as SqlUuid};
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{StatusSyncError, StatusSyncRepository};
use crate::domain::{StatusSyncOutcome, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::pool::DbPool;

const ACTIVE_TEAM_SQL: &str = r#"
    SELECT a.team_lead_id FROM assignments a WHERE a.status = 'active'
    UNION
    SELECT m.user_id
    FROM assignment_members m
    JOIN assignments a ON a.id = m.assignment_id
    WHERE a.status = 'active'
"#;

fn promote_sql() -> String {
    format!(
        r#"
UPDATE users SET status = 'on_assignment'
WHERE status <> 'on_assignment'
  AND ($1::uuid[] IS NULL OR id = ANY($1))
  AND id IN ({ACTIVE_TEAM_SQL})
"#
    )
}

fn release_sql() -> String {
    format!(
        r#"
UPDATE users SET status = 'available'
WHERE status = 'on_assignment'
  AND ($1::uuid[] IS NULL OR id = ANY($1))
  AND id NOT IN ({ACTIVE_TEAM_SQL})
"#
    )
}

/// Diesel implementation of [`StatusSyncRepository`].
#[derive(Clone)]
pub struct DieselStatusSyncRepository {
    pool: DbPool,
}

impl DieselStatusSyncRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn run(&self, scope: Option<Vec<Uuid>>) -> Result<StatusSyncOutcome, StatusSyncError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, StatusSyncError::connection))?;

        let (promoted, released) = conn
            .transaction(|conn| {
                async move {
                    let promoted = sql_query(promote_sql())
                        .bind::<Nullable<Array<SqlUuid>>, _>(&scope)
                        .execute(conn)
                        .await?;
                    let released = sql_query(release_sql())
                        .bind::<Nullable<Array<SqlUuid>>, _>(&scope)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>((promoted, released))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| {
                map_basic_diesel_error(err, StatusSyncError::query, StatusSyncError::connection)
            })?;

        debug!(promoted, released, "user statuses synchronised");
        Ok(StatusSyncOutcome {
            promoted: u64::try_from(promoted).unwrap_or(u64::MAX),
            released: u64::try_from(released).unwrap_or(u64::MAX),
        })
    }
}

#[async_trait]
impl StatusSyncRepository for DieselStatusSyncRepository {
    async fn sync_all(&self) -> Result<StatusSyncOutcome, StatusSyncError> {
        self.run(None).await
    }

    async fn sync_users(&self, user_ids: &[UserId]) -> Result<StatusSyncOutcome, StatusSyncError> {
        if user_ids.is_empty() {
            return Ok(StatusSyncOutcome::default());
        }
        self.run(Some(user_ids.iter().map(|id| *id.as_uuid()).collect()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn promotion_skips_users_already_on_assignment() {
        let sql = promote_sql();
        assert!(sql.contains("status <> 'on_assignment'"));
        assert!(sql.contains("id IN ("));
    }

    #[rstest]
    fn release_only_touches_on_assignment_users() {
        let sql = release_sql();
        assert!(sql.contains("WHERE status = 'on_assignment'"));
        assert!(sql.contains("NOT IN ("));
        assert!(!sql.contains("on_leave"));
    }
}
