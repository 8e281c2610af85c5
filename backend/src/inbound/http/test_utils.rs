//! Test helpers for HTTP handlers.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Scope, web};
use serde_json::Value;

use crate::domain::ports::{
    MockAssignmentManagement, MockDashboard, MockLocations, MockRouteCalculation, MockStatusSync,
    MockUserManagement, MockVehicleTracking, MockWorkLogs,
};

use super::state::HttpState;
use super::validation::{json_config, query_config};

/// Mock driving ports; tests set expectations on the ones their handler
/// uses and leave the rest untouched so stray calls fail loudly.
#[derive(Default)]
pub struct MockPorts {
    pub users: MockUserManagement,
    pub assignments: MockAssignmentManagement,
    pub status_sync: MockStatusSync,
    pub work_logs: MockWorkLogs,
    pub locations: MockLocations,
    pub routes: MockRouteCalculation,
    pub vehicles: MockVehicleTracking,
    pub dashboard: MockDashboard,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            users: Arc::new(self.users),
            assignments: Arc::new(self.assignments),
            status_sync: Arc::new(self.status_sync),
            work_logs: Arc::new(self.work_logs),
            locations: Arc::new(self.locations),
            routes: Arc::new(self.routes),
            vehicles: Arc::new(self.vehicles),
            dashboard: Arc::new(self.dashboard),
        })
    }
}

/// Read `details.<key>` from an error payload.
pub fn error_detail<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get("details").and_then(|details| details.get(key))
}

/// App serving `api` (normally a `/api/v1` scope) over the given mocks with
/// the production extractor configuration.
pub fn test_app(
    ports: MockPorts,
    api: Scope,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(ports.into_state())
        .app_data(json_config())
        .app_data(query_config())
        .service(api)
}
