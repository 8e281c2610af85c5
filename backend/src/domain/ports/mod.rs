//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, mapping providers, GPS feed) are implemented by
//! outbound adapters. Driving ports are implemented by domain services and
//! consumed by the HTTP adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_management;
mod assignment_repository;
mod dashboard;
mod dashboard_repository;
mod gps_feed;
mod location_repository;
mod locations;
mod route_calculation;
mod route_provider;
mod status_sync;
mod status_sync_repository;
mod user_management;
mod user_repository;
mod vehicle_presence_repository;
mod vehicle_tracking;
mod work_log_repository;
mod work_logs;

#[cfg(test)]
pub use assignment_management::MockAssignmentManagement;
pub use assignment_management::{AssignmentManagement, NewAssignment};
#[cfg(test)]
pub use assignment_repository::MockAssignmentRepository;
pub use assignment_repository::{
    AssignmentFilter, AssignmentPersistenceError, AssignmentRepository,
};
#[cfg(test)]
pub use dashboard::MockDashboard;
pub use dashboard::{
    DEFAULT_TOP_WORKERS, Dashboard, DashboardStats, MAX_TOP_WORKERS, StatusCount,
};
#[cfg(test)]
pub use dashboard_repository::MockDashboardRepository;
pub use dashboard_repository::{DashboardRepository, DashboardRepositoryError};
#[cfg(test)]
pub use gps_feed::MockGpsFeed;
pub use gps_feed::{GpsFeed, GpsFeedError};
#[cfg(test)]
pub use location_repository::MockLocationRepository;
pub use location_repository::{LocationPersistenceError, LocationRepository};
#[cfg(test)]
pub use locations::MockLocations;
pub use locations::{Locations, NewLocality, NewStore};
#[cfg(test)]
pub use route_calculation::MockRouteCalculation;
pub use route_calculation::{RouteCalculation, RouteEstimateResponse};
#[cfg(test)]
pub use route_provider::{MockDirectionsProvider, MockGeocoder};
pub use route_provider::{DirectionsProvider, Geocoder, RouteProviderError};
#[cfg(test)]
pub use status_sync::MockStatusSync;
pub use status_sync::StatusSync;
#[cfg(test)]
pub use status_sync_repository::MockStatusSyncRepository;
pub use status_sync_repository::{StatusSyncError, StatusSyncRepository};
#[cfg(test)]
pub use user_management::MockUserManagement;
pub use user_management::{NewUser, UserManagement};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use vehicle_presence_repository::MockVehiclePresenceRepository;
pub use vehicle_presence_repository::{VehiclePresenceError, VehiclePresenceRepository};
#[cfg(test)]
pub use vehicle_tracking::MockVehicleTracking;
pub use vehicle_tracking::{
    PresenceSyncReport, TripTimesApplied, VehicleDebugReport, VehicleTracking,
};
#[cfg(test)]
pub use work_log_repository::MockWorkLogRepository;
pub use work_log_repository::{WorkLogFilter, WorkLogPersistenceError, WorkLogRepository};
#[cfg(test)]
pub use work_logs::MockWorkLogs;
pub use work_logs::{NewWorkLog, WorkLogs};

#[cfg(test)]
mod tests;
