//! Assignment (field trip) data model and lifecycle rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{AssignmentId, CarPlate, LocalityId, StoreId, UserId};

/// Validation errors for assignments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssignmentValidationError {
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("team lead {0} cannot also be listed as a member")]
    LeadListedAsMember(UserId),
    #[error("return time is before departure time")]
    ReturnBeforeDeparture,
    #[error("distance must be a finite, non-negative number of kilometres")]
    InvalidDistance,
    #[error("travel minutes must not be negative")]
    InvalidTravelMinutes,
    #[error("cannot move assignment from {from} to {to}")]
    InvalidTransition {
        from: AssignmentStatus,
        to: AssignmentStatus,
    },
    #[error("unknown assignment kind: {0}")]
    UnknownKind(String),
    #[error("unknown assignment status: {0}")]
    UnknownStatus(String),
}

/// Type of work performed on an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Installation,
    Maintenance,
    Inspection,
    Delivery,
    Other,
}

impl AssignmentKind {
    pub const ALL: [Self; 5] = [
        Self::Installation,
        Self::Maintenance,
        Self::Inspection,
        Self::Delivery,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Installation => "installation",
            Self::Maintenance => "maintenance",
            Self::Inspection => "inspection",
            Self::Delivery => "delivery",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentKind {
    type Err = AssignmentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AssignmentValidationError::UnknownKind(s.to_owned()))
    }
}

/// Lifecycle state of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub const ALL: [Self; 4] = [
        Self::Planned,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the assignment still ties up its team.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Planned | Self::Active)
    }

    /// Whether moving to `next` is allowed. Staying put is always allowed.
    ///
    /// # Examples
    /// ```
    /// use fleet_backend::domain::AssignmentStatus;
    ///
    /// assert!(AssignmentStatus::Planned.can_transition_to(AssignmentStatus::Active));
    /// assert!(!AssignmentStatus::Completed.can_transition_to(AssignmentStatus::Active));
    /// ```
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Planned, Self::Planned)
                | (Self::Active, Self::Active)
                | (Self::Completed, Self::Completed)
                | (Self::Cancelled, Self::Cancelled)
                | (Self::Planned, Self::Active | Self::Cancelled)
                | (Self::Active, Self::Completed | Self::Cancelled)
        )
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = AssignmentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AssignmentValidationError::UnknownStatus(s.to_owned()))
    }
}

/// Input for [`Assignment::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentDraft {
    pub id: AssignmentId,
    pub kind: AssignmentKind,
    pub locality_id: LocalityId,
    pub store_id: Option<StoreId>,
    pub team_lead_id: UserId,
    pub member_ids: Vec<UserId>,
    pub status: AssignmentStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub car_plate: Option<CarPlate>,
    pub distance_km: Option<f64>,
    pub travel_minutes: Option<i32>,
    pub departure_at: Option<DateTime<Utc>>,
    pub return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Field trip of a team to a locality, optionally to a specific store.
///
/// ## Invariants
/// - `end_date`, when present, is not before `start_date`.
/// - `member_ids` is free of duplicates and never contains the team lead.
/// - `return_at`, when both are present, is not before `departure_at`.
/// - `distance_km` is the round trip; `travel_minutes` is one way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    id: AssignmentId,
    kind: AssignmentKind,
    locality_id: LocalityId,
    store_id: Option<StoreId>,
    team_lead_id: UserId,
    member_ids: Vec<UserId>,
    status: AssignmentStatus,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    car_plate: Option<CarPlate>,
    distance_km: Option<f64>,
    travel_minutes: Option<i32>,
    departure_at: Option<DateTime<Utc>>,
    return_at: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl Assignment {
    /// Validate a draft. Duplicate member ids are collapsed, keeping the
    /// first occurrence.
    pub fn new(draft: AssignmentDraft) -> Result<Self, AssignmentValidationError> {
        let AssignmentDraft {
            id,
            kind,
            locality_id,
            store_id,
            team_lead_id,
            member_ids,
            status,
            start_date,
            end_date,
            car_plate,
            distance_km,
            travel_minutes,
            departure_at,
            return_at,
            notes,
        } = draft;

        if let Some(end) = end_date.filter(|end| *end < start_date) {
            return Err(AssignmentValidationError::EndBeforeStart {
                start: start_date,
                end,
            });
        }
        if member_ids.contains(&team_lead_id) {
            return Err(AssignmentValidationError::LeadListedAsMember(team_lead_id));
        }
        if matches!((departure_at, return_at), (Some(departure), Some(ret)) if ret < departure) {
            return Err(AssignmentValidationError::ReturnBeforeDeparture);
        }
        if distance_km.is_some_and(|km| !km.is_finite() || km < 0.0) {
            return Err(AssignmentValidationError::InvalidDistance);
        }
        if travel_minutes.is_some_and(|minutes| minutes < 0) {
            return Err(AssignmentValidationError::InvalidTravelMinutes);
        }

        let mut unique_members = Vec::with_capacity(member_ids.len());
        for member in member_ids {
            if !unique_members.contains(&member) {
                unique_members.push(member);
            }
        }

        Ok(Self {
            id,
            kind,
            locality_id,
            store_id,
            team_lead_id,
            member_ids: unique_members,
            status,
            start_date,
            end_date,
            car_plate,
            distance_km,
            travel_minutes,
            departure_at,
            return_at,
            notes: notes
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
        })
    }

    pub fn id(&self) -> AssignmentId {
        self.id
    }

    pub fn kind(&self) -> AssignmentKind {
        self.kind
    }

    pub fn locality_id(&self) -> LocalityId {
        self.locality_id
    }

    pub fn store_id(&self) -> Option<StoreId> {
        self.store_id
    }

    pub fn team_lead_id(&self) -> UserId {
        self.team_lead_id
    }

    pub fn member_ids(&self) -> &[UserId] {
        &self.member_ids
    }

    /// Team lead followed by the members.
    pub fn team(&self) -> Vec<UserId> {
        std::iter::once(self.team_lead_id)
            .chain(self.member_ids.iter().copied())
            .collect()
    }

    /// Whether `user` leads or belongs to this assignment.
    pub fn involves(&self, user: UserId) -> bool {
        self.team_lead_id == user || self.member_ids.contains(&user)
    }

    pub fn status(&self) -> AssignmentStatus {
        self.status
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Last calendar day covered by the assignment.
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn car_plate(&self) -> Option<&CarPlate> {
        self.car_plate.as_ref()
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    pub fn travel_minutes(&self) -> Option<i32> {
        self.travel_minutes
    }

    pub fn departure_at(&self) -> Option<DateTime<Utc>> {
        self.departure_at
    }

    pub fn return_at(&self) -> Option<DateTime<Utc>> {
        self.return_at
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Rebuild as a draft, for edits that must be re-validated.
    pub fn into_draft(self) -> AssignmentDraft {
        AssignmentDraft {
            id: self.id,
            kind: self.kind,
            locality_id: self.locality_id,
            store_id: self.store_id,
            team_lead_id: self.team_lead_id,
            member_ids: self.member_ids,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            car_plate: self.car_plate,
            distance_km: self.distance_km,
            travel_minutes: self.travel_minutes,
            departure_at: self.departure_at,
            return_at: self.return_at,
            notes: self.notes,
        }
    }

    /// Move to `next`, enforcing the lifecycle.
    pub fn transition_to(mut self, next: AssignmentStatus) -> Result<Self, AssignmentValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(AssignmentValidationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(self)
    }

    /// Apply a partial update and re-validate.
    pub fn apply(self, patch: AssignmentPatch) -> Result<Self, AssignmentValidationError> {
        let mut draft = self.into_draft();
        let AssignmentPatch {
            kind,
            locality_id,
            store_id,
            team_lead_id,
            member_ids,
            start_date,
            end_date,
            car_plate,
            notes,
        } = patch;
        if let Some(kind) = kind {
            draft.kind = kind;
        }
        if let Some(locality_id) = locality_id {
            draft.locality_id = locality_id;
        }
        if let Some(store_id) = store_id {
            draft.store_id = store_id;
        }
        if let Some(team_lead_id) = team_lead_id {
            draft.team_lead_id = team_lead_id;
        }
        if let Some(member_ids) = member_ids {
            draft.member_ids = member_ids;
        }
        if let Some(start_date) = start_date {
            draft.start_date = start_date;
        }
        if let Some(end_date) = end_date {
            draft.end_date = end_date;
        }
        if let Some(car_plate) = car_plate {
            draft.car_plate = car_plate;
        }
        if let Some(notes) = notes {
            draft.notes = notes;
        }
        Self::new(draft)
    }

    /// Store route figures: round-trip kilometres and one-way minutes.
    #[must_use]
    pub fn with_route(mut self, estimate: &super::RouteEstimate) -> Self {
        self.distance_km = Some(estimate.round_trip_km);
        self.travel_minutes = Some(estimate.one_way_minutes);
        self
    }

    /// Fill trip times from GPS inference.
    ///
    /// Without `force`, only missing values are filled. With `force`, both
    /// values are replaced, so a trip without a return clears the stored
    /// one. Returns whether anything changed.
    pub fn apply_trip_times(&mut self, trip: &super::TripTimes, force: bool) -> bool {
        let mut changed = false;
        if force || self.departure_at.is_none() {
            changed |= self.departure_at != Some(trip.departure_at);
            self.departure_at = Some(trip.departure_at);
        }
        if force {
            changed |= self.return_at != trip.return_at;
            self.return_at = trip.return_at;
        } else if let Some(ret) = trip.return_at.filter(|_| self.return_at.is_none()) {
            changed = true;
            self.return_at = Some(ret);
        }
        if matches!((self.departure_at, self.return_at), (Some(departure), Some(ret)) if ret < departure) {
            self.return_at = None;
        }
        changed
    }
}

/// Partial update for an assignment. Nested `Option`s distinguish "leave
/// unchanged" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPatch {
    pub kind: Option<AssignmentKind>,
    pub locality_id: Option<LocalityId>,
    pub store_id: Option<Option<StoreId>>,
    pub team_lead_id: Option<UserId>,
    pub member_ids: Option<Vec<UserId>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub car_plate: Option<Option<CarPlate>>,
    pub notes: Option<Option<String>>,
}

#[cfg(test)]
#[path = "assignment_tests.rs"]
mod tests;
