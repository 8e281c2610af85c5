//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{AppSettings, ServerConfig, SettingsError};
#[cfg(feature = "metrics")]
pub(crate) use metrics::build_prometheus;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use fleet_backend::Trace;
#[cfg(debug_assertions)]
use fleet_backend::doc::ApiDoc;
use fleet_backend::inbound::http::admin::sync_statuses;
use fleet_backend::inbound::http::assignments::{
    apply_trip_times, change_assignment_status, create_assignment, delete_assignment,
    get_assignment, list_assignments, recalculate_route, update_assignment,
};
use fleet_backend::inbound::http::dashboard::{dashboard_stats, top_workers};
use fleet_backend::inbound::http::gps::{
    debug_vehicle, infer_trip_times, list_devices, sync_presence,
};
use fleet_backend::inbound::http::health::{HealthState, live, ready};
use fleet_backend::inbound::http::locations::{
    create_locality, create_store, list_localities, list_stores,
};
use fleet_backend::inbound::http::routes::estimate_route;
use fleet_backend::inbound::http::state::HttpState;
use fleet_backend::inbound::http::users::{
    create_user, delete_user, get_user, list_users, set_user_status, update_user,
};
use fleet_backend::inbound::http::validation::{json_config, query_config};
use fleet_backend::inbound::http::work_logs::{
    delete_work_log, hours_by_user, list_work_logs, log_hours,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// REST endpoints under `/api/v1`.
fn api_scope() -> actix_web::Scope {
    web::scope("/api/v1")
        .service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(set_user_status)
        .service(delete_user)
        .service(list_assignments)
        .service(create_assignment)
        .service(get_assignment)
        .service(update_assignment)
        .service(change_assignment_status)
        .service(delete_assignment)
        .service(recalculate_route)
        .service(apply_trip_times)
        // Static segment before `/work-logs/{id}` siblings.
        .service(hours_by_user)
        .service(list_work_logs)
        .service(log_hours)
        .service(delete_work_log)
        .service(list_localities)
        .service(create_locality)
        .service(list_stores)
        .service(create_store)
        .service(estimate_route)
        .service(list_devices)
        .service(sync_presence)
        .service(infer_trip_times)
        .service(debug_vehicle)
        .service(sync_statuses)
        .service(dashboard_stats)
        .service(top_workers)
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .service(api_scope())
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from the health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when an outbound client cannot be built or
/// binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config.db_pool, &config.adapters)
        .map(web::Data::new)
        .map_err(|err| std::io::Error::other(format!("failed to build adapters: {err}")))?;
    let server_health_state = health_state.clone();

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
