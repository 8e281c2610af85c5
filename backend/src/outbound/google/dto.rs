//! DTOs for Google Geocoding and Directions JSON responses.
//!
//! Both APIs answer HTTP 200 and report failures through `status`; the
//! mapping from status to port error lives here with the DTOs.

use serde::Deserialize;

use crate::domain::ports::RouteProviderError;
use crate::domain::{Coordinates, RouteLeg};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) results: Vec<GeocodeResultDto>,
    pub(super) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResultDto {
    pub(super) geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    pub(super) location: LatLngDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) routes: Vec<DirectionsRouteDto>,
    pub(super) error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsRouteDto {
    #[serde(default)]
    pub(super) legs: Vec<DirectionsLegDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsLegDto {
    pub(super) distance: ValueDto,
    pub(super) duration: ValueDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ValueDto {
    pub(super) value: f64,
}

/// Translate a non-`OK` API status.
pub(super) fn status_error(status: &str, detail: Option<&str>) -> RouteProviderError {
    let message = detail.map_or_else(|| status.to_owned(), |detail| format!("{status}: {detail}"));
    match status {
        "ZERO_RESULTS" | "NOT_FOUND" | "MAX_ROUTE_LENGTH_EXCEEDED" => {
            RouteProviderError::no_match(message)
        }
        "UNKNOWN_ERROR" => RouteProviderError::unavailable(message),
        _ => RouteProviderError::rejected(message),
    }
}

impl GeocodeResponseDto {
    pub(super) fn into_coordinates(self) -> Result<Coordinates, RouteProviderError> {
        if self.status != "OK" {
            return Err(status_error(&self.status, self.error_message.as_deref()));
        }
        let location = self
            .results
            .into_iter()
            .next()
            .map(|result| result.geometry.location)
            .ok_or_else(|| RouteProviderError::no_match("geocoding returned no results"))?;
        Coordinates::new(location.lat, location.lng)
            .map_err(|err| RouteProviderError::rejected(format!("invalid geocoding result: {err}")))
    }
}

impl DirectionsResponseDto {
    /// Sum every leg of the first route.
    pub(super) fn into_leg(self) -> Result<RouteLeg, RouteProviderError> {
        if self.status != "OK" {
            return Err(status_error(&self.status, self.error_message.as_deref()));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .filter(|route| !route.legs.is_empty())
            .ok_or_else(|| RouteProviderError::no_match("directions returned no route"))?;
        Ok(route.legs.iter().fold(
            RouteLeg {
                distance_meters: 0.0,
                duration_seconds: 0.0,
            },
            |total, leg| RouteLeg {
                distance_meters: total.distance_meters + leg.distance.value,
                duration_seconds: total.duration_seconds + leg.duration.value,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn geocode_takes_first_result() {
        let body = r#"{
            "status": "OK",
            "results": [
                { "geometry": { "location": { "lat": 44.57, "lng": 25.95 } } },
                { "geometry": { "location": { "lat": 1.0, "lng": 1.0 } } }
            ]
        }"#;
        let dto: GeocodeResponseDto = serde_json::from_str(body).expect("json");
        let coords = dto.into_coordinates().expect("coordinates");
        assert!((coords.latitude() - 44.57).abs() < f64::EPSILON);
        assert!((coords.longitude() - 25.95).abs() < f64::EPSILON);
    }

    #[rstest]
    fn directions_sum_all_legs() {
        let body = r#"{
            "status": "OK",
            "routes": [{
                "legs": [
                    { "distance": { "value": 1200, "text": "1.2 km" }, "duration": { "value": 90 } },
                    { "distance": { "value": 800 }, "duration": { "value": 60 } }
                ]
            }]
        }"#;
        let dto: DirectionsResponseDto = serde_json::from_str(body).expect("json");
        let leg = dto.into_leg().expect("leg");
        assert!((leg.distance_meters - 2_000.0).abs() < f64::EPSILON);
        assert!((leg.duration_seconds - 150.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case("ZERO_RESULTS", "NoMatch")]
    #[case("NOT_FOUND", "NoMatch")]
    #[case("REQUEST_DENIED", "Rejected")]
    #[case("OVER_QUERY_LIMIT", "Rejected")]
    #[case("UNKNOWN_ERROR", "Unavailable")]
    fn statuses_map_to_port_errors(#[case] status: &str, #[case] expected: &str) {
        let err = status_error(status, Some("detail"));
        let matched = match expected {
            "NoMatch" => matches!(err, RouteProviderError::NoMatch { .. }),
            "Rejected" => matches!(err, RouteProviderError::Rejected { .. }),
            _ => matches!(err, RouteProviderError::Unavailable { .. }),
        };
        assert!(matched, "{status} mapped to {err:?}");
    }

    #[rstest]
    fn ok_without_routes_is_no_match() {
        let dto: DirectionsResponseDto =
            serde_json::from_str(r#"{ "status": "OK", "routes": [] }"#).expect("json");
        assert!(matches!(
            dto.into_leg(),
            Err(RouteProviderError::NoMatch { .. })
        ));
    }
}
