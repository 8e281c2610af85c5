//! Builders wiring Diesel repositories, outbound adapters and domain
//! services into the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use fleet_backend::domain::ports::{DirectionsProvider, Geocoder, GpsFeed};
use fleet_backend::domain::{
    AssignmentService, DashboardService, LocationService, RouteService, StatusSyncService,
    UserService, VehicleTrackingService, WorkLogService,
};
use fleet_backend::inbound::http::state::HttpState;
use fleet_backend::outbound::HttpClientError;
use fleet_backend::outbound::google::GoogleMapsClient;
use fleet_backend::outbound::gps::HttpGpsFeed;
use fleet_backend::outbound::mapbox::MapboxClient;
use fleet_backend::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselDashboardRepository, DieselLocationRepository,
    DieselStatusSyncRepository, DieselUserRepository, DieselVehiclePresenceRepository,
    DieselWorkLogRepository,
};

use super::config::{AdapterSettings, RouteProviderSettings};

type RouteProviders = (Arc<dyn Geocoder>, Arc<dyn DirectionsProvider>);

fn build_route_providers(
    settings: &AdapterSettings,
) -> Result<RouteProviders, HttpClientError> {
    match &settings.route_provider {
        RouteProviderSettings::Google { api_key } => {
            let client = Arc::new(GoogleMapsClient::new(api_key.clone(), settings.http_timeout)?);
            let geocoder: Arc<dyn Geocoder> = client.clone();
            let directions: Arc<dyn DirectionsProvider> = client;
            Ok((geocoder, directions))
        }
        RouteProviderSettings::Mapbox { access_token } => {
            let client = Arc::new(MapboxClient::new(
                access_token.clone(),
                settings.http_timeout,
            )?);
            let geocoder: Arc<dyn Geocoder> = client.clone();
            let directions: Arc<dyn DirectionsProvider> = client;
            Ok((geocoder, directions))
        }
    }
}

/// Repositories sharing one connection pool.
struct Repositories {
    users: Arc<DieselUserRepository>,
    assignments: Arc<DieselAssignmentRepository>,
    locations: Arc<DieselLocationRepository>,
    status_sync: Arc<DieselStatusSyncRepository>,
    work_logs: Arc<DieselWorkLogRepository>,
    presence: Arc<DieselVehiclePresenceRepository>,
    dashboard: Arc<DieselDashboardRepository>,
}

impl Repositories {
    fn new(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            assignments: Arc::new(DieselAssignmentRepository::new(pool.clone())),
            locations: Arc::new(DieselLocationRepository::new(pool.clone())),
            status_sync: Arc::new(DieselStatusSyncRepository::new(pool.clone())),
            work_logs: Arc::new(DieselWorkLogRepository::new(pool.clone())),
            presence: Arc::new(DieselVehiclePresenceRepository::new(pool.clone())),
            dashboard: Arc::new(DieselDashboardRepository::new(pool.clone())),
        }
    }
}

/// Build the HTTP state from a pool and adapter settings.
///
/// # Errors
/// Returns [`HttpClientError`] when an outbound HTTP client cannot be
/// constructed, e.g. because the GPS base URL does not parse.
pub(crate) fn build_http_state(
    pool: &DbPool,
    settings: &AdapterSettings,
) -> Result<HttpState, HttpClientError> {
    let repos = Repositories::new(pool);
    let (geocoder, directions) = build_route_providers(settings)?;
    let feed: Arc<dyn GpsFeed> = Arc::new(HttpGpsFeed::new(
        &settings.gps_base_url,
        settings.gps_token.clone(),
        settings.http_timeout,
    )?);
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    Ok(HttpState {
        users: Arc::new(UserService::new(repos.users.clone())),
        assignments: Arc::new(AssignmentService::new(
            repos.assignments.clone(),
            repos.users.clone(),
            repos.locations.clone(),
            repos.status_sync.clone(),
        )),
        status_sync: Arc::new(StatusSyncService::new(repos.status_sync)),
        work_logs: Arc::new(WorkLogService::new(
            repos.work_logs.clone(),
            repos.assignments.clone(),
        )),
        locations: Arc::new(LocationService::new(repos.locations.clone())),
        routes: Arc::new(RouteService::new(
            geocoder,
            directions,
            repos.assignments.clone(),
            repos.locations,
            settings.geofence.center(),
        )),
        vehicles: Arc::new(VehicleTrackingService::new(
            feed,
            repos.presence,
            repos.assignments,
            settings.geofence,
            settings.local_offset,
        )),
        dashboard: Arc::new(DashboardService::new(
            repos.dashboard,
            repos.work_logs,
            clock,
            settings.local_offset,
        )),
    })
}
