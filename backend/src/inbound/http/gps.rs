//! GPS presence handlers.
//!
//! ```text
//! GET  /api/v1/gps/devices
//! POST /api/v1/gps/sync {"carPlate":"IS12ABC","from":"2025-03-10T00:00:00Z","to":"2025-03-11T00:00:00Z"}
//! GET  /api/v1/gps/vehicles/{plate}/trip-times?from=2025-03-10&to=2025-03-11
//! GET  /api/v1/gps/vehicles/{plate}/debug?from=2025-03-10&to=2025-03-10
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{PresenceSyncReport, VehicleDebugReport};
use crate::domain::{CarPlate, Error, GpsDevice, VehiclePresence};
use crate::inbound::http::ApiResult;
use crate::inbound::http::assignments::TripTimesResponse;
use crate::inbound::http::routes::PointResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, parse_rfc3339_timestamp};
use crate::inbound::http::work_logs::PeriodQuery;

const CAR_PLATE: FieldName = FieldName::new("carPlate");
const FROM: FieldName = FieldName::new("from");
const PLATE: FieldName = FieldName::new("plate");
const TO: FieldName = FieldName::new("to");

fn parse_plate(raw: &str, field: FieldName) -> Result<CarPlate, Error> {
    CarPlate::new(raw).map_err(|err| invalid_value_error(field, raw, err))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GpsDeviceResponse {
    pub id: i64,
    pub name: String,
    /// Plate parsed from the device name, when it contains one.
    pub car_plate: Option<String>,
}

impl From<GpsDevice> for GpsDeviceResponse {
    fn from(device: GpsDevice) -> Self {
        Self {
            id: device.id,
            name: device.name,
            car_plate: device.car_plate.map(String::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSyncResponse {
    pub car_plate: String,
    pub device_id: i64,
    /// Valid fixes received from the feed.
    pub fetched: usize,
    /// Rows written after de-duplication.
    pub inserted: usize,
}

impl From<PresenceSyncReport> for PresenceSyncResponse {
    fn from(report: PresenceSyncReport) -> Self {
        Self {
            car_plate: report.car_plate.into(),
            device_id: report.device_id,
            fetched: report.fetched,
            inserted: report.inserted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSampleResponse {
    pub recorded_at: DateTime<Utc>,
    pub position: PointResponse,
    pub distance_to_depot_meters: f64,
    pub at_depot: bool,
}

impl From<VehiclePresence> for PresenceSampleResponse {
    fn from(sample: VehiclePresence) -> Self {
        Self {
            recorded_at: sample.recorded_at,
            position: sample.position.into(),
            distance_to_depot_meters: sample.distance_to_depot_meters,
            at_depot: sample.at_depot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDebugResponse {
    pub car_plate: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub at_depot_count: usize,
    pub away_count: usize,
    pub trip: Option<TripTimesResponse>,
    pub samples: Vec<PresenceSampleResponse>,
}

impl From<VehicleDebugReport> for VehicleDebugResponse {
    fn from(report: VehicleDebugReport) -> Self {
        Self {
            car_plate: report.car_plate.into(),
            window_start: report.window_start,
            window_end: report.window_end,
            at_depot_count: report.at_depot_count,
            away_count: report.away_count,
            trip: report.trip.map(TripTimesResponse::from),
            samples: report
                .samples
                .into_iter()
                .map(PresenceSampleResponse::from)
                .collect(),
        }
    }
}

/// Body for `POST /api/v1/gps/sync`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncPresenceRequest {
    #[schema(example = "IS12ABC")]
    pub car_plate: String,
    /// RFC 3339 start of the window.
    #[schema(example = "2025-03-10T00:00:00Z")]
    pub from: String,
    /// RFC 3339 end of the window.
    #[schema(example = "2025-03-11T00:00:00Z")]
    pub to: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/gps/devices",
    responses(
        (status = 200, description = "Devices known to the GPS feed", body = [GpsDeviceResponse]),
        (status = 503, description = "GPS feed unavailable", body = ErrorSchema)
    ),
    tags = ["gps"],
    operation_id = "listGpsDevices"
)]
#[get("/gps/devices")]
pub async fn list_devices(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<GpsDeviceResponse>>> {
    let devices = state.vehicles.list_devices().await?;
    Ok(web::Json(devices.into_iter().map(GpsDeviceResponse::from).collect()))
}

/// Pull positions for one vehicle and store them as presence samples.
#[utoipa::path(
    post,
    path = "/api/v1/gps/sync",
    request_body = SyncPresenceRequest,
    responses(
        (status = 200, description = "Sync report", body = PresenceSyncResponse),
        (status = 400, description = "Invalid plate or window", body = ErrorSchema),
        (status = 404, description = "No device for the plate", body = ErrorSchema),
        (status = 503, description = "GPS feed unavailable", body = ErrorSchema)
    ),
    tags = ["gps"],
    operation_id = "syncPresence"
)]
#[post("/gps/sync")]
pub async fn sync_presence(
    state: web::Data<HttpState>,
    payload: web::Json<SyncPresenceRequest>,
) -> ApiResult<web::Json<PresenceSyncResponse>> {
    let plate = parse_plate(&payload.car_plate, CAR_PLATE)?;
    let from = parse_rfc3339_timestamp(&payload.from, FROM)?;
    let to = parse_rfc3339_timestamp(&payload.to, TO)?;
    let report = state.vehicles.sync_presence(plate, from, to).await?;
    Ok(web::Json(report.into()))
}

/// Departure and return inferred from stored presence over local days.
#[utoipa::path(
    get,
    path = "/api/v1/gps/vehicles/{plate}/trip-times",
    params(("plate" = String, Path, description = "Car plate"), PeriodQuery),
    responses(
        (status = 200, description = "Trip window, or null without a departure", body = Option<TripTimesResponse>),
        (status = 400, description = "Invalid plate or period", body = ErrorSchema)
    ),
    tags = ["gps"],
    operation_id = "inferTripTimes"
)]
#[get("/gps/vehicles/{plate}/trip-times")]
pub async fn infer_trip_times(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> ApiResult<web::Json<Option<TripTimesResponse>>> {
    let plate = parse_plate(&path, PLATE)?;
    let (from, to) = query.parse()?;
    let trip = state.vehicles.infer_trip_times(plate, from, to).await?;
    Ok(web::Json(trip.map(TripTimesResponse::from)))
}

/// Stored samples with depot classification for troubleshooting.
#[utoipa::path(
    get,
    path = "/api/v1/gps/vehicles/{plate}/debug",
    params(("plate" = String, Path, description = "Car plate"), PeriodQuery),
    responses(
        (status = 200, description = "Presence report", body = VehicleDebugResponse),
        (status = 400, description = "Invalid plate or period", body = ErrorSchema)
    ),
    tags = ["gps"],
    operation_id = "debugVehicle"
)]
#[get("/gps/vehicles/{plate}/debug")]
pub async fn debug_vehicle(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> ApiResult<web::Json<VehicleDebugResponse>> {
    let plate = parse_plate(&path, PLATE)?;
    let (from, to) = query.parse()?;
    let report = state.vehicles.debug_vehicle(plate, from, to).await?;
    Ok(web::Json(report.into()))
}
