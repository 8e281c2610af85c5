//! Assignment lifecycle service.
//!
//! Creation and edits check every referenced locality, store and user before
//! persisting. Any change to who is on an active assignment, or to whether it
//! is active at all, is followed by a status resync of the affected users.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    AssignmentFilter, AssignmentManagement, AssignmentPersistenceError, AssignmentRepository,
    LocationPersistenceError, LocationRepository, NewAssignment, StatusSyncError,
    StatusSyncRepository, UserRepository,
};
use crate::domain::user_service::map_user_repository_error;
use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, AssignmentPatch, AssignmentStatus,
    AssignmentValidationError, Error, LocalityId, StoreId, UserId,
};

pub(crate) fn map_assignment_repository_error(error: AssignmentPersistenceError) -> Error {
    match error {
        AssignmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        AssignmentPersistenceError::Query { message } => {
            Error::internal(format!("assignment repository error: {message}"))
        }
    }
}

pub(crate) fn map_location_repository_error(error: LocationPersistenceError) -> Error {
    match error {
        LocationPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("location repository unavailable: {message}"))
        }
        LocationPersistenceError::Query { message } => {
            Error::internal(format!("location repository error: {message}"))
        }
        LocationPersistenceError::Duplicate { message } => Error::conflict(message),
    }
}

pub(crate) fn map_status_sync_error(error: StatusSyncError) -> Error {
    match error {
        StatusSyncError::Connection { message } => {
            Error::service_unavailable(format!("status sync unavailable: {message}"))
        }
        StatusSyncError::Query { message } => {
            Error::internal(format!("status sync failed: {message}"))
        }
    }
}

pub(crate) fn map_assignment_validation_error(error: AssignmentValidationError) -> Error {
    match error {
        AssignmentValidationError::InvalidTransition { from, to } => {
            Error::conflict(format!("cannot move assignment from {from} to {to}"))
                .with_details(json!({ "from": from, "to": to }))
        }
        other => Error::invalid_request(other.to_string()),
    }
}

pub(crate) fn assignment_not_found(id: AssignmentId) -> Error {
    Error::not_found(format!("assignment {id} not found"))
}

fn missing_reference(field: &str, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": "unknown_reference" }))
}

/// Service implementing [`AssignmentManagement`].
#[derive(Clone)]
pub struct AssignmentService<A, U, L, S> {
    assignment_repo: Arc<A>,
    user_repo: Arc<U>,
    location_repo: Arc<L>,
    status_sync_repo: Arc<S>,
}

impl<A, U, L, S> AssignmentService<A, U, L, S> {
    pub fn new(
        assignment_repo: Arc<A>,
        user_repo: Arc<U>,
        location_repo: Arc<L>,
        status_sync_repo: Arc<S>,
    ) -> Self {
        Self {
            assignment_repo,
            user_repo,
            location_repo,
            status_sync_repo,
        }
    }
}

impl<A, U, L, S> AssignmentService<A, U, L, S>
where
    A: AssignmentRepository,
    U: UserRepository,
    L: LocationRepository,
    S: StatusSyncRepository,
{
    async fn load(&self, id: AssignmentId) -> Result<Assignment, Error> {
        self.assignment_repo
            .find_by_id(&id)
            .await
            .map_err(map_assignment_repository_error)?
            .ok_or_else(|| assignment_not_found(id))
    }

    async fn check_references(
        &self,
        locality_id: LocalityId,
        store_id: Option<StoreId>,
        team: &[UserId],
    ) -> Result<(), Error> {
        let locality = self
            .location_repo
            .find_locality(&locality_id)
            .await
            .map_err(map_location_repository_error)?;
        if locality.is_none() {
            return Err(missing_reference(
                "localityId",
                format!("locality {locality_id} does not exist"),
            ));
        }

        if let Some(store_id) = store_id {
            let store = self
                .location_repo
                .find_store(&store_id)
                .await
                .map_err(map_location_repository_error)?
                .ok_or_else(|| {
                    missing_reference("storeId", format!("store {store_id} does not exist"))
                })?;
            if store.locality_id() != locality_id {
                return Err(Error::invalid_request(format!(
                    "store {store_id} is not in locality {locality_id}"
                ))
                .with_details(json!({ "field": "storeId", "code": "locality_mismatch" })));
            }
        }

        let found = self
            .user_repo
            .find_many(team)
            .await
            .map_err(map_user_repository_error)?;
        if let Some(missing) = team
            .iter()
            .find(|id| !found.iter().any(|user| user.id() == **id))
        {
            return Err(missing_reference(
                "memberIds",
                format!("user {missing} does not exist"),
            ));
        }
        Ok(())
    }

    async fn persist_update(&self, assignment: &Assignment) -> Result<(), Error> {
        let updated = self
            .assignment_repo
            .update(assignment)
            .await
            .map_err(map_assignment_repository_error)?;
        if updated {
            Ok(())
        } else {
            Err(assignment_not_found(assignment.id()))
        }
    }

    async fn resync(&self, users: &[UserId]) -> Result<(), Error> {
        if users.is_empty() {
            return Ok(());
        }
        let outcome = self
            .status_sync_repo
            .sync_users(users)
            .await
            .map_err(map_status_sync_error)?;
        info!(
            users = users.len(),
            promoted = outcome.promoted,
            released = outcome.released,
            "team statuses resynchronised"
        );
        Ok(())
    }
}

fn merged_team(before: &Assignment, after: &Assignment) -> Vec<UserId> {
    let mut team = before.team();
    for user in after.team() {
        if !team.contains(&user) {
            team.push(user);
        }
    }
    team
}

#[async_trait]
impl<A, U, L, S> AssignmentManagement for AssignmentService<A, U, L, S>
where
    A: AssignmentRepository,
    U: UserRepository,
    L: LocationRepository,
    S: StatusSyncRepository,
{
    async fn list_assignments(&self, filter: AssignmentFilter) -> Result<Vec<Assignment>, Error> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(Error::invalid_request("`to` must not be before `from`"));
            }
        }
        self.assignment_repo
            .list(&filter)
            .await
            .map_err(map_assignment_repository_error)
    }

    async fn get_assignment(&self, id: AssignmentId) -> Result<Assignment, Error> {
        self.load(id).await
    }

    async fn create_assignment(&self, request: NewAssignment) -> Result<Assignment, Error> {
        let status = request.status.unwrap_or(AssignmentStatus::Planned);
        if !matches!(status, AssignmentStatus::Planned | AssignmentStatus::Active) {
            return Err(Error::invalid_request(format!(
                "new assignments must be planned or active, not {status}"
            ))
            .with_details(json!({ "field": "status", "code": "invalid_initial_status" })));
        }

        let assignment = Assignment::new(AssignmentDraft {
            id: AssignmentId::random(),
            kind: request.kind,
            locality_id: request.locality_id,
            store_id: request.store_id,
            team_lead_id: request.team_lead_id,
            member_ids: request.member_ids,
            status,
            start_date: request.start_date,
            end_date: request.end_date,
            car_plate: request.car_plate,
            distance_km: None,
            travel_minutes: None,
            departure_at: None,
            return_at: None,
            notes: request.notes,
        })
        .map_err(map_assignment_validation_error)?;

        let team = assignment.team();
        self.check_references(assignment.locality_id(), assignment.store_id(), &team)
            .await?;
        self.assignment_repo
            .insert(&assignment)
            .await
            .map_err(map_assignment_repository_error)?;
        info!(assignment_id = %assignment.id(), status = %status, "assignment created");

        if status == AssignmentStatus::Active {
            self.resync(&team).await?;
        }
        Ok(assignment)
    }

    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> Result<Assignment, Error> {
        let before = self.load(id).await?;
        let after = before
            .clone()
            .apply(patch)
            .map_err(map_assignment_validation_error)?;

        self.check_references(after.locality_id(), after.store_id(), &after.team())
            .await?;
        self.persist_update(&after).await?;

        if before.team() != after.team() && after.status() == AssignmentStatus::Active {
            self.resync(&merged_team(&before, &after)).await?;
        }
        Ok(after)
    }

    async fn change_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<Assignment, Error> {
        let current = self.load(id).await?;
        let previous = current.status();
        let updated = current
            .transition_to(status)
            .map_err(map_assignment_validation_error)?;
        if previous == status {
            return Ok(updated);
        }

        self.persist_update(&updated).await?;
        info!(assignment_id = %id, from = %previous, to = %status, "assignment status changed");
        self.resync(&updated.team()).await?;
        Ok(updated)
    }

    async fn delete_assignment(&self, id: AssignmentId) -> Result<(), Error> {
        let team = self
            .assignment_repo
            .delete(&id)
            .await
            .map_err(map_assignment_repository_error)?
            .ok_or_else(|| assignment_not_found(id))?;
        info!(assignment_id = %id, "assignment deleted");
        self.resync(&team).await
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
