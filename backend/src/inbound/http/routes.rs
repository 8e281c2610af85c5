//! Route estimate handler.
//!
//! ```text
//! POST /api/v1/routes/estimate {"destination":"Pascani, Iasi"}
//! ```
//!
//! Without an origin the estimate starts at the depot.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Coordinates;
use crate::domain::ports::RouteEstimateResponse;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Latitude/longitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointResponse {
    #[schema(example = 47.1585)]
    pub latitude: f64,
    #[schema(example = 27.6014)]
    pub longitude: f64,
}

impl From<Coordinates> for PointResponse {
    fn from(value: Coordinates) -> Self {
        Self {
            latitude: value.latitude(),
            longitude: value.longitude(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimateBody {
    pub origin: PointResponse,
    pub destination: PointResponse,
    /// One-way driving distance rounded to 0.1 km.
    #[schema(example = 15.4)]
    pub one_way_km: f64,
    #[schema(example = 30.8)]
    pub round_trip_km: f64,
    /// One-way driving time rounded to whole minutes.
    #[schema(example = 21)]
    pub one_way_minutes: i32,
}

impl From<RouteEstimateResponse> for RouteEstimateBody {
    fn from(value: RouteEstimateResponse) -> Self {
        Self {
            origin: value.origin.into(),
            destination: value.destination.into(),
            one_way_km: value.estimate.one_way_km,
            round_trip_km: value.estimate.round_trip_km,
            one_way_minutes: value.estimate.one_way_minutes,
        }
    }
}

/// Body for `POST /api/v1/routes/estimate`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRouteRequest {
    /// Free-text address; defaults to the depot.
    pub origin: Option<String>,
    #[schema(example = "Pascani, Iasi")]
    pub destination: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/routes/estimate",
    request_body = EstimateRouteRequest,
    responses(
        (status = 200, description = "Estimate", body = RouteEstimateBody),
        (status = 400, description = "Empty destination", body = ErrorSchema),
        (status = 404, description = "Address not found", body = ErrorSchema),
        (status = 503, description = "Mapping provider unavailable", body = ErrorSchema)
    ),
    tags = ["routes"],
    operation_id = "estimateRoute"
)]
#[post("/routes/estimate")]
pub async fn estimate_route(
    state: web::Data<HttpState>,
    payload: web::Json<EstimateRouteRequest>,
) -> ApiResult<web::Json<RouteEstimateBody>> {
    let EstimateRouteRequest {
        origin,
        destination,
    } = payload.into_inner();
    let estimate = state.routes.estimate_route(origin, destination).await?;
    Ok(web::Json(estimate.into()))
}
