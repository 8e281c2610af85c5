//! Shared HTTP adapter state.
//!
//! Handlers receive this state through `actix_web::web::Data` and only see the
//! driving ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AssignmentManagement, Dashboard, Locations, RouteCalculation, StatusSync, UserManagement,
    VehicleTracking, WorkLogs,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserManagement>,
    pub assignments: Arc<dyn AssignmentManagement>,
    pub status_sync: Arc<dyn StatusSync>,
    pub work_logs: Arc<dyn WorkLogs>,
    pub locations: Arc<dyn Locations>,
    pub routes: Arc<dyn RouteCalculation>,
    pub vehicles: Arc<dyn VehicleTracking>,
    pub dashboard: Arc<dyn Dashboard>,
}
