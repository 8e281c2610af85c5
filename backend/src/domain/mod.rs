//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed fleet entities (users, assignments, work
//! logs, locations, vehicle presence) together with the services that
//! implement the driving ports. Types validate their invariants on
//! construction and document serialisation contracts in their Rustdoc.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - [`TraceId`]: per-request correlation identifier.
//! - Entities: [`User`], [`Assignment`], [`WorkLog`], [`Locality`],
//!   [`Store`], [`VehiclePresence`].
//! - Services: one per driving port in [`ports`].

pub mod assignment;
pub mod assignment_service;
pub mod dashboard_service;
pub mod error;
pub mod ids;
pub mod location;
pub mod location_service;
pub mod ports;
pub mod route;
pub mod route_service;
pub mod status_sync;
pub mod status_sync_service;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod vehicle;
pub mod vehicle_tracking_service;
pub mod work_log;
pub mod work_log_service;

pub use self::assignment::{
    Assignment, AssignmentDraft, AssignmentKind, AssignmentPatch, AssignmentStatus,
    AssignmentValidationError,
};
pub use self::assignment_service::AssignmentService;
pub use self::dashboard_service::{DashboardService, clamp_limit};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{AssignmentId, LocalityId, StoreId, UserId, WorkLogId};
pub use self::location::{Coordinates, Locality, LocationValidationError, Store, StoreDraft};
pub use self::location_service::LocationService;
pub use self::route::{RouteEstimate, RouteLeg, meters_to_km, seconds_to_minutes};
pub use self::route_service::{RouteService, destination_query};
pub use self::status_sync::{StatusSyncOutcome, status_after_sync};
pub use self::status_sync_service::StatusSyncService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    FULL_NAME_MAX, FULL_NAME_MIN, FullName, PhoneNumber, User, UserPatch, UserRole, UserStatus,
    UserValidationError,
};
pub use self::user_service::UserService;
pub use self::vehicle::{
    CarPlate, DepotGeofence, GpsDevice, LocalDayWindow, PositionSample, TripTimes,
    VehiclePresence, VehicleValidationError, infer_trip_times,
};
pub use self::vehicle_tracking_service::VehicleTrackingService;
pub use self::work_log::{
    Hours, MAX_HOURS_PER_ENTRY, UserHours, WorkLog, WorkLogValidationError, rank_user_hours,
};
pub use self::work_log_service::WorkLogService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use fleet_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::conflict("assignment already completed"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
