//! Internal Diesel row structs.
//!
//! Row types never leave the persistence layer; repositories convert them
//! into domain entities and back.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    assignment_members, assignments, localities, stores, users, vehicle_presence, work_logs,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub status: String,
}

/// Insert and full-row update shape for users.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRecord<'a> {
    pub id: Uuid,
    pub full_name: &'a str,
    pub role: &'a str,
    pub phone: Option<&'a str>,
    pub status: &'a str,
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = localities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LocalityRow {
    pub id: Uuid,
    pub name: String,
    pub county: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = localities)]
pub(crate) struct NewLocalityRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub county: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StoreRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub locality_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stores)]
pub(crate) struct NewStoreRow<'a> {
    pub id: Uuid,
    pub code: &'a str,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub locality_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub kind: String,
    pub locality_id: Uuid,
    pub store_id: Option<Uuid>,
    pub team_lead_id: Uuid,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub car_plate: Option<String>,
    pub distance_km: Option<f64>,
    pub travel_minutes: Option<i32>,
    pub departure_at: Option<DateTime<Utc>>,
    pub return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Insert and full-row update shape for assignments. `None` clears the
/// column on update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssignmentRecord<'a> {
    pub id: Uuid,
    pub kind: &'a str,
    pub locality_id: Uuid,
    pub store_id: Option<Uuid>,
    pub team_lead_id: Uuid,
    pub status: &'a str,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub car_plate: Option<&'a str>,
    pub distance_km: Option<f64>,
    pub travel_minutes: Option<i32>,
    pub departure_at: Option<DateTime<Utc>>,
    pub return_at: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = assignment_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentMemberRow {
    pub assignment_id: Uuid,
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Work logs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = work_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WorkLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assignment_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = work_logs)]
pub(crate) struct NewWorkLogRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assignment_id: Uuid,
    pub work_date: NaiveDate,
    pub hours: f64,
    pub description: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Vehicle presence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = vehicle_presence)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct VehiclePresenceRow {
    pub car_plate: String,
    pub recorded_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_to_depot_m: f64,
    pub at_depot: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vehicle_presence)]
pub(crate) struct NewVehiclePresenceRow<'a> {
    pub car_plate: &'a str,
    pub recorded_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_to_depot_m: f64,
    pub at_depot: bool,
}
