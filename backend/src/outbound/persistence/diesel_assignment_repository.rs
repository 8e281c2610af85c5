//! PostgreSQL-backed `AssignmentRepository`.
//!
//! Assignments and their member rows are always written together inside a
//! transaction. Reads load the assignment rows first and then the members
//! for the whole page in one query.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{AssignmentFilter, AssignmentPersistenceError, AssignmentRepository};
use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, AssignmentKind, AssignmentStatus, CarPlate,
    LocalityId, StoreId, UserId,
};

use super::diesel_error_mapping::{map_basic_diesel_error, map_pool_error};
use super::models::{AssignmentMemberRow, AssignmentRecord, AssignmentRow};
use super::pool::DbPool;
use super::schema::{assignment_members, assignments, work_logs};

/// Diesel implementation of [`AssignmentRepository`].
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
}

impl DieselAssignmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> AssignmentPersistenceError {
    map_basic_diesel_error(
        error,
        AssignmentPersistenceError::query,
        AssignmentPersistenceError::connection,
    )
}

fn row_to_assignment(row: AssignmentRow, members: Vec<Uuid>) -> Result<Assignment, String> {
    let kind = row
        .kind
        .parse::<AssignmentKind>()
        .map_err(|err| err.to_string())?;
    let status = row
        .status
        .parse::<AssignmentStatus>()
        .map_err(|err| err.to_string())?;
    let car_plate = row
        .car_plate
        .map(CarPlate::new)
        .transpose()
        .map_err(|err| err.to_string())?;

    Assignment::new(AssignmentDraft {
        id: AssignmentId::from_uuid(row.id),
        kind,
        locality_id: LocalityId::from_uuid(row.locality_id),
        store_id: row.store_id.map(StoreId::from_uuid),
        team_lead_id: UserId::from_uuid(row.team_lead_id),
        member_ids: members.into_iter().map(UserId::from_uuid).collect(),
        status,
        start_date: row.start_date,
        end_date: row.end_date,
        car_plate,
        distance_km: row.distance_km,
        travel_minutes: row.travel_minutes,
        departure_at: row.departure_at,
        return_at: row.return_at,
        notes: row.notes,
    })
    .map_err(|err| format!("assignment {}: {err}", row.id))
}

fn assignment_record(assignment: &Assignment) -> AssignmentRecord<'_> {
    AssignmentRecord {
        id: *assignment.id().as_uuid(),
        kind: assignment.kind().as_str(),
        locality_id: *assignment.locality_id().as_uuid(),
        store_id: assignment.store_id().map(|id| *id.as_uuid()),
        team_lead_id: *assignment.team_lead_id().as_uuid(),
        status: assignment.status().as_str(),
        start_date: assignment.start_date(),
        end_date: assignment.end_date(),
        car_plate: assignment.car_plate().map(|plate| plate.as_ref()),
        distance_km: assignment.distance_km(),
        travel_minutes: assignment.travel_minutes(),
        departure_at: assignment.departure_at(),
        return_at: assignment.return_at(),
        notes: assignment.notes(),
    }
}

fn member_rows(assignment: &Assignment) -> Vec<AssignmentMemberRow> {
    let assignment_id = *assignment.id().as_uuid();
    assignment
        .member_ids()
        .iter()
        .map(|user| AssignmentMemberRow {
            assignment_id,
            user_id: *user.as_uuid(),
        })
        .collect()
}

/// Load members for `rows` and assemble domain assignments.
async fn attach_members(
    conn: &mut AsyncPgConnection,
    rows: Vec<AssignmentRow>,
) -> Result<Vec<Assignment>, AssignmentPersistenceError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let member_rows: Vec<AssignmentMemberRow> = assignment_members::table
        .filter(assignment_members::assignment_id.eq_any(&ids))
        .select(AssignmentMemberRow::as_select())
        .order_by((assignment_members::assignment_id, assignment_members::user_id))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for member in member_rows {
        members
            .entry(member.assignment_id)
            .or_default()
            .push(member.user_id);
    }

    rows.into_iter()
        .map(|row| {
            let team = members.remove(&row.id).unwrap_or_default();
            row_to_assignment(row, team)
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(AssignmentPersistenceError::query)
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn list(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, AssignmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AssignmentPersistenceError::connection))?;

        let mut query = assignments::table
            .select(AssignmentRow::as_select())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(assignments::status.eq(status.as_str()));
        }
        if let Some(user) = filter.user_id {
            let user = *user.as_uuid();
            let member_of = assignment_members::table
                .filter(assignment_members::user_id.eq(user))
                .select(assignment_members::assignment_id);
            query = query.filter(
                assignments::team_lead_id
                    .eq(user)
                    .or(assignments::id.eq_any(member_of)),
            );
        }
        if let Some(from) = filter.from {
            // A null end date means a single-day assignment; `end_date >=
            // start_date` keeps this equivalent to comparing the last day.
            query = query.filter(
                assignments::end_date
                    .ge(from)
                    .or(assignments::start_date.ge(from)),
            );
        }
        if let Some(to) = filter.to {
            query = query.filter(assignments::start_date.le(to));
        }

        let rows: Vec<AssignmentRow> = query
            .order_by((assignments::start_date.desc(), assignments::created_at.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        attach_members(&mut conn, rows).await
    }

    async fn find_by_id(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Assignment>, AssignmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AssignmentPersistenceError::connection))?;

        let row: Option<AssignmentRow> = assignments::table
            .find(id.as_uuid())
            .select(AssignmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(found) = row else {
            return Ok(None);
        };

        Ok(attach_members(&mut conn, vec![found]).await?.pop())
    }

    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AssignmentPersistenceError::connection))?;

        let record = assignment_record(assignment);
        let members = member_rows(assignment);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(assignments::table)
                    .values(&record)
                    .execute(conn)
                    .await?;
                if !members.is_empty() {
                    diesel::insert_into(assignment_members::table)
                        .values(&members)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(&self, assignment: &Assignment) -> Result<bool, AssignmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AssignmentPersistenceError::connection))?;

        let id = *assignment.id().as_uuid();
        let record = assignment_record(assignment);
        let members = member_rows(assignment);
        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(assignments::table.find(id))
                    .set(&record)
                    .execute(conn)
                    .await?;
                if updated == 0 {
                    return Ok(false);
                }
                diesel::delete(
                    assignment_members::table.filter(assignment_members::assignment_id.eq(id)),
                )
                .execute(conn)
                .await?;
                if !members.is_empty() {
                    diesel::insert_into(assignment_members::table)
                        .values(&members)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<Vec<UserId>>, AssignmentPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AssignmentPersistenceError::connection))?;

        let id = *id.as_uuid();
        let team = conn
            .transaction(|conn| {
                async move {
                    let lead: Option<Uuid> = assignments::table
                        .find(id)
                        .select(assignments::team_lead_id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(lead) = lead else {
                        return Ok(None);
                    };
                    let members: Vec<Uuid> = assignment_members::table
                        .filter(assignment_members::assignment_id.eq(id))
                        .select(assignment_members::user_id)
                        .load(conn)
                        .await?;

                    diesel::delete(work_logs::table.filter(work_logs::assignment_id.eq(id)))
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        assignment_members::table
                            .filter(assignment_members::assignment_id.eq(id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(assignments::table.find(id))
                        .execute(conn)
                        .await?;

                    let mut team = Vec::with_capacity(members.len() + 1);
                    team.push(lead);
                    team.extend(members);
                    Ok::<_, diesel::result::Error>(Some(team))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(team.map(|ids| ids.into_iter().map(UserId::from_uuid).collect()))
    }
}
