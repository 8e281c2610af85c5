//! Assignment handlers.
//!
//! ```text
//! GET    /api/v1/assignments?status=active&userId=..&from=2025-03-01&to=2025-03-31
//! POST   /api/v1/assignments
//! GET    /api/v1/assignments/{id}
//! PATCH  /api/v1/assignments/{id}
//! PUT    /api/v1/assignments/{id}/status {"status":"active"}
//! DELETE /api/v1/assignments/{id}
//! POST   /api/v1/assignments/{id}/route
//! POST   /api/v1/assignments/{id}/trip-times?force=true
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{AssignmentFilter, NewAssignment, TripTimesApplied};
use crate::domain::{
    Assignment, AssignmentId, AssignmentKind, AssignmentPatch, AssignmentStatus, CarPlate, Error,
    TripTimes,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, nullable, parse_date, parse_field, parse_id, parse_id_list,
    parse_optional_date, parse_optional_field, parse_optional_id,
};

const ASSIGNMENT_ID: FieldName = FieldName::new("id");
const CAR_PLATE: FieldName = FieldName::new("carPlate");
const END_DATE: FieldName = FieldName::new("endDate");
const FROM: FieldName = FieldName::new("from");
const KIND: FieldName = FieldName::new("kind");
const LOCALITY_ID: FieldName = FieldName::new("localityId");
const MEMBER_IDS: FieldName = FieldName::new("memberIds");
const START_DATE: FieldName = FieldName::new("startDate");
const STATUS: FieldName = FieldName::new("status");
const STORE_ID: FieldName = FieldName::new("storeId");
const TEAM_LEAD_ID: FieldName = FieldName::new("teamLeadId");
const TO: FieldName = FieldName::new("to");
const USER_ID: FieldName = FieldName::new("userId");

/// Assignment as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: Uuid,
    #[schema(example = "maintenance")]
    pub kind: String,
    pub locality_id: Uuid,
    pub store_id: Option<Uuid>,
    pub team_lead_id: Uuid,
    pub member_ids: Vec<Uuid>,
    #[schema(example = "planned")]
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[schema(example = "B123ABC")]
    pub car_plate: Option<String>,
    /// Round trip distance in kilometres.
    pub distance_km: Option<f64>,
    /// One way driving time in minutes.
    pub travel_minutes: Option<i32>,
    pub departure_at: Option<DateTime<Utc>>,
    pub return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(assignment: Assignment) -> Self {
        Self {
            id: *assignment.id().as_uuid(),
            kind: assignment.kind().as_str().to_owned(),
            locality_id: *assignment.locality_id().as_uuid(),
            store_id: assignment.store_id().map(|id| *id.as_uuid()),
            team_lead_id: *assignment.team_lead_id().as_uuid(),
            member_ids: assignment
                .member_ids()
                .iter()
                .map(|id| *id.as_uuid())
                .collect(),
            status: assignment.status().as_str().to_owned(),
            start_date: assignment.start_date(),
            end_date: assignment.end_date(),
            car_plate: assignment.car_plate().map(|plate| plate.as_ref().to_owned()),
            distance_km: assignment.distance_km(),
            travel_minutes: assignment.travel_minutes(),
            departure_at: assignment.departure_at(),
            return_at: assignment.return_at(),
            notes: assignment.notes().map(str::to_owned),
        }
    }
}

/// Inferred trip window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripTimesResponse {
    pub departure_at: DateTime<Utc>,
    pub return_at: Option<DateTime<Utc>>,
}

impl From<TripTimes> for TripTimesResponse {
    fn from(trip: TripTimes) -> Self {
        Self {
            departure_at: trip.departure_at,
            return_at: trip.return_at,
        }
    }
}

/// Outcome of `POST /api/v1/assignments/{id}/trip-times`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripTimesAppliedResponse {
    pub assignment: AssignmentResponse,
    /// `null` when GPS presence shows no departure in the assignment's days.
    pub trip: Option<TripTimesResponse>,
    /// Whether the stored departure or return changed.
    pub changed: bool,
}

impl From<TripTimesApplied> for TripTimesAppliedResponse {
    fn from(applied: TripTimesApplied) -> Self {
        Self {
            assignment: applied.assignment.into(),
            trip: applied.trip.map(TripTimesResponse::from),
            changed: applied.changed,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsQuery {
    /// One of `planned`, `active`, `completed`, `cancelled`.
    pub status: Option<String>,
    /// Only assignments led by or including this user.
    pub user_id: Option<String>,
    /// Inclusive lower bound (`YYYY-MM-DD`) of the overlap filter.
    pub from: Option<String>,
    /// Inclusive upper bound (`YYYY-MM-DD`) of the overlap filter.
    pub to: Option<String>,
}

impl TryFrom<&ListAssignmentsQuery> for AssignmentFilter {
    type Error = Error;

    fn try_from(query: &ListAssignmentsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            status: parse_optional_field(query.status.as_deref(), STATUS)?,
            user_id: parse_optional_id(query.user_id.as_deref(), USER_ID)?,
            from: parse_optional_date(query.from.as_deref(), FROM)?,
            to: parse_optional_date(query.to.as_deref(), TO)?,
        })
    }
}

/// Body for `POST /api/v1/assignments`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    #[schema(example = "installation")]
    pub kind: String,
    pub locality_id: String,
    pub store_id: Option<String>,
    pub team_lead_id: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
    /// `planned` (default) or `active`.
    pub status: Option<String>,
    #[schema(example = "2025-03-10")]
    pub start_date: String,
    pub end_date: Option<String>,
    pub car_plate: Option<String>,
    pub notes: Option<String>,
}

fn parse_plate(raw: &str) -> Result<CarPlate, Error> {
    CarPlate::new(raw).map_err(|err| invalid_value_error(CAR_PLATE, raw, err))
}

impl TryFrom<CreateAssignmentRequest> for NewAssignment {
    type Error = Error;

    fn try_from(value: CreateAssignmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: parse_field::<AssignmentKind>(&value.kind, KIND)?,
            locality_id: parse_id(&value.locality_id, LOCALITY_ID)?,
            store_id: parse_optional_id(value.store_id.as_deref(), STORE_ID)?,
            team_lead_id: parse_id(&value.team_lead_id, TEAM_LEAD_ID)?,
            member_ids: parse_id_list(&value.member_ids, MEMBER_IDS)?,
            status: parse_optional_field::<AssignmentStatus>(value.status.as_deref(), STATUS)?,
            start_date: parse_date(&value.start_date, START_DATE)?,
            end_date: parse_optional_date(value.end_date.as_deref(), END_DATE)?,
            car_plate: value.car_plate.as_deref().map(parse_plate).transpose()?,
            notes: value.notes,
        })
    }
}

/// Body for `PATCH /api/v1/assignments/{id}`. Fields set to `null` are
/// cleared; absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub kind: Option<String>,
    pub locality_id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub store_id: Option<Option<String>>,
    pub team_lead_id: Option<String>,
    pub member_ids: Option<Vec<String>>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub car_plate: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

fn transpose_nullable<T>(
    value: Option<Option<String>>,
    parse: impl FnOnce(&str) -> Result<T, Error>,
) -> Result<Option<Option<T>>, Error> {
    match value {
        None => Ok(None),
        Some(None) => Ok(Some(None)),
        Some(Some(raw)) => parse(&raw).map(|parsed| Some(Some(parsed))),
    }
}

impl TryFrom<UpdateAssignmentRequest> for AssignmentPatch {
    type Error = Error;

    fn try_from(value: UpdateAssignmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: parse_optional_field::<AssignmentKind>(value.kind.as_deref(), KIND)?,
            locality_id: parse_optional_id(value.locality_id.as_deref(), LOCALITY_ID)?,
            store_id: transpose_nullable(value.store_id, |raw| parse_id(raw, STORE_ID))?,
            team_lead_id: parse_optional_id(value.team_lead_id.as_deref(), TEAM_LEAD_ID)?,
            member_ids: value
                .member_ids
                .map(|ids| parse_id_list(&ids, MEMBER_IDS))
                .transpose()?,
            start_date: parse_optional_date(value.start_date.as_deref(), START_DATE)?,
            end_date: transpose_nullable(value.end_date, |raw| parse_date(raw, END_DATE))?,
            car_plate: transpose_nullable(value.car_plate, parse_plate)?,
            notes: transpose_nullable(value.notes, |raw| Ok(raw.to_owned()))?,
        })
    }
}

/// Body for `PUT /api/v1/assignments/{id}/status`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    #[schema(example = "active")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TripTimesQuery {
    /// Overwrite departure and return even when already set.
    #[serde(default)]
    pub force: bool,
}

fn assignment_id(path: &str) -> Result<AssignmentId, Error> {
    parse_id(path, ASSIGNMENT_ID)
}

/// List assignments, newest start date first.
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    params(ListAssignmentsQuery),
    responses(
        (status = 200, description = "Assignments", body = [AssignmentResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "listAssignments"
)]
#[get("/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    query: web::Query<ListAssignmentsQuery>,
) -> ApiResult<web::Json<Vec<AssignmentResponse>>> {
    let filter = AssignmentFilter::try_from(&*query)?;
    let assignments = state.assignments.list_assignments(filter).await?;
    Ok(web::Json(
        assignments.into_iter().map(AssignmentResponse::from).collect(),
    ))
}

/// Create an assignment after checking its locality, store and team exist.
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Created", body = AssignmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Referenced locality, store or user missing", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "createAssignment"
)]
#[post("/assignments")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    payload: web::Json<CreateAssignmentRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewAssignment::try_from(payload.into_inner())?;
    let assignment = state.assignments.create_assignment(request).await?;
    Ok(HttpResponse::Created().json(AssignmentResponse::from(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment identifier")),
    responses(
        (status = 200, description = "Assignment with members", body = AssignmentResponse),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "getAssignment"
)]
#[get("/assignments/{id}")]
pub async fn get_assignment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let assignment = state.assignments.get_assignment(assignment_id(&path)?).await?;
    Ok(web::Json(assignment.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment identifier")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Updated", body = AssignmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "updateAssignment"
)]
#[patch("/assignments/{id}")]
pub async fn update_assignment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateAssignmentRequest>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let id = assignment_id(&path)?;
    let patch = AssignmentPatch::try_from(payload.into_inner())?;
    let assignment = state.assignments.update_assignment(id, patch).await?;
    Ok(web::Json(assignment.into()))
}

/// Move an assignment through its lifecycle and resynchronise team statuses.
#[utoipa::path(
    put,
    path = "/api/v1/assignments/{id}/status",
    params(("id" = Uuid, Path, description = "Assignment identifier")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Updated", body = AssignmentResponse),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Transition not allowed", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "changeAssignmentStatus"
)]
#[put("/assignments/{id}/status")]
pub async fn change_assignment_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ChangeStatusRequest>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let id = assignment_id(&path)?;
    let status = parse_field::<AssignmentStatus>(&payload.status, STATUS)?;
    let assignment = state.assignments.change_status(id, status).await?;
    Ok(web::Json(assignment.into()))
}

/// Delete an assignment with its members and work logs.
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "deleteAssignment"
)]
#[delete("/assignments/{id}")]
pub async fn delete_assignment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.assignments.delete_assignment(assignment_id(&path)?).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Recompute distance and travel time from the depot to the assignment's
/// store or locality.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/route",
    params(("id" = Uuid, Path, description = "Assignment identifier")),
    responses(
        (status = 200, description = "Route figures stored", body = AssignmentResponse),
        (status = 404, description = "Assignment missing or no route found", body = ErrorSchema),
        (status = 503, description = "Mapping provider unavailable", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "recalculateAssignmentRoute"
)]
#[post("/assignments/{id}/route")]
pub async fn recalculate_route(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssignmentResponse>> {
    let assignment = state
        .routes
        .recalculate_assignment_route(assignment_id(&path)?)
        .await?;
    Ok(web::Json(assignment.into()))
}

/// Fill departure and return times from the vehicle's GPS presence.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/trip-times",
    params(
        ("id" = Uuid, Path, description = "Assignment identifier"),
        TripTimesQuery
    ),
    responses(
        (status = 200, description = "Inference outcome", body = TripTimesAppliedResponse),
        (status = 400, description = "Assignment has no car plate", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["assignments"],
    operation_id = "applyTripTimes"
)]
#[post("/assignments/{id}/trip-times")]
pub async fn apply_trip_times(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<TripTimesQuery>,
) -> ApiResult<web::Json<TripTimesAppliedResponse>> {
    let applied = state
        .vehicles
        .apply_trip_times(assignment_id(&path)?, query.force)
        .await?;
    Ok(web::Json(applied.into()))
}

#[cfg(test)]
#[path = "assignments_tests.rs"]
mod tests;
