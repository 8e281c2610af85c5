//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the error schema wrappers ([`ErrorSchema`], [`ErrorCodeSchema`]) so
//! domain types stay free of utoipa derives.
//!
//! The document is served by Swagger UI in debug builds and exported via
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fleet backend API",
        description = "Team members, assignments, work hours, routes and GPS presence for field installation crews."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::set_user_status,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::assignments::list_assignments,
        crate::inbound::http::assignments::create_assignment,
        crate::inbound::http::assignments::get_assignment,
        crate::inbound::http::assignments::update_assignment,
        crate::inbound::http::assignments::change_assignment_status,
        crate::inbound::http::assignments::delete_assignment,
        crate::inbound::http::assignments::recalculate_route,
        crate::inbound::http::assignments::apply_trip_times,
        crate::inbound::http::work_logs::list_work_logs,
        crate::inbound::http::work_logs::log_hours,
        crate::inbound::http::work_logs::hours_by_user,
        crate::inbound::http::work_logs::delete_work_log,
        crate::inbound::http::locations::list_localities,
        crate::inbound::http::locations::create_locality,
        crate::inbound::http::locations::list_stores,
        crate::inbound::http::locations::create_store,
        crate::inbound::http::routes::estimate_route,
        crate::inbound::http::gps::list_devices,
        crate::inbound::http::gps::sync_presence,
        crate::inbound::http::gps::infer_trip_times,
        crate::inbound::http::gps::debug_vehicle,
        crate::inbound::http::admin::sync_statuses,
        crate::inbound::http::dashboard::dashboard_stats,
        crate::inbound::http::dashboard::top_workers,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "users", description = "Team members and availability"),
        (name = "assignments", description = "Installation and maintenance jobs"),
        (name = "work-logs", description = "Hours worked per day"),
        (name = "locations", description = "Localities and stores"),
        (name = "routes", description = "Driving distance and time estimates"),
        (name = "gps", description = "Vehicle presence from the GPS feed"),
        (name = "admin", description = "Maintenance operations"),
        (name = "dashboard", description = "Aggregate statistics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
