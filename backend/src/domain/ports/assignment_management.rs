//! Driving port for assignment lifecycle operations.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Assignment, AssignmentId, AssignmentKind, AssignmentPatch, AssignmentStatus, CarPlate, Error,
    LocalityId, StoreId, UserId,
};

use super::AssignmentFilter;

/// Input for creating an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub kind: AssignmentKind,
    pub locality_id: LocalityId,
    pub store_id: Option<StoreId>,
    pub team_lead_id: UserId,
    pub member_ids: Vec<UserId>,
    /// Only `planned` (the default) or `active` are accepted.
    pub status: Option<AssignmentStatus>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub car_plate: Option<CarPlate>,
    pub notes: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentManagement: Send + Sync {
    async fn list_assignments(&self, filter: AssignmentFilter) -> Result<Vec<Assignment>, Error>;

    async fn get_assignment(&self, id: AssignmentId) -> Result<Assignment, Error>;

    async fn create_assignment(&self, request: NewAssignment) -> Result<Assignment, Error>;

    async fn update_assignment(
        &self,
        id: AssignmentId,
        patch: AssignmentPatch,
    ) -> Result<Assignment, Error>;

    /// Validate the transition and resynchronise the team's statuses.
    async fn change_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<Assignment, Error>;

    /// Delete the assignment with its logs and members, then resynchronise
    /// the former team.
    async fn delete_assignment(&self, id: AssignmentId) -> Result<(), Error>;
}
