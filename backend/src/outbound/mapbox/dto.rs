//! DTOs for Mapbox Geocoding and Directions responses.

use serde::Deserialize;

use crate::domain::ports::RouteProviderError;
use crate::domain::{Coordinates, RouteLeg};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    #[serde(default)]
    pub(super) features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureDto {
    /// `[longitude, latitude]`.
    pub(super) center: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsResponseDto {
    pub(super) code: String,
    #[serde(default)]
    pub(super) routes: Vec<DirectionsRouteDto>,
    pub(super) message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsRouteDto {
    /// Metres.
    pub(super) distance: f64,
    /// Seconds.
    pub(super) duration: f64,
}

/// Body of a non-2xx Mapbox response.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    pub(super) message: Option<String>,
}

impl GeocodeResponseDto {
    pub(super) fn into_coordinates(self) -> Result<Coordinates, RouteProviderError> {
        let [lng, lat] = self
            .features
            .into_iter()
            .next()
            .map(|feature| feature.center)
            .ok_or_else(|| RouteProviderError::no_match("geocoding returned no features"))?;
        Coordinates::new(lat, lng)
            .map_err(|err| RouteProviderError::rejected(format!("invalid geocoding result: {err}")))
    }
}

impl DirectionsResponseDto {
    pub(super) fn into_leg(self) -> Result<RouteLeg, RouteProviderError> {
        let detail = self
            .message
            .map_or_else(|| self.code.clone(), |message| format!("{}: {message}", self.code));
        match self.code.as_str() {
            "Ok" => self
                .routes
                .into_iter()
                .next()
                .map(|route| RouteLeg {
                    distance_meters: route.distance,
                    duration_seconds: route.duration,
                })
                .ok_or_else(|| RouteProviderError::no_match("directions returned no route")),
            "NoRoute" | "NoSegment" => Err(RouteProviderError::no_match(detail)),
            _ => Err(RouteProviderError::rejected(detail)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn feature_center_is_longitude_first() {
        let dto: GeocodeResponseDto = serde_json::from_str(
            r#"{ "type": "FeatureCollection", "features": [{ "center": [25.95, 44.57] }] }"#,
        )
        .expect("json");
        let coords = dto.into_coordinates().expect("coordinates");
        assert!((coords.latitude() - 44.57).abs() < f64::EPSILON);
        assert!((coords.longitude() - 25.95).abs() < f64::EPSILON);
    }

    #[rstest]
    fn empty_feature_list_is_no_match() {
        let dto: GeocodeResponseDto = serde_json::from_str(r#"{ "features": [] }"#).expect("json");
        assert!(matches!(
            dto.into_coordinates(),
            Err(RouteProviderError::NoMatch { .. })
        ));
    }

    #[rstest]
    fn first_route_is_used() {
        let dto: DirectionsResponseDto = serde_json::from_str(
            r#"{ "code": "Ok", "routes": [
                { "distance": 15420.3, "duration": 1230.8 },
                { "distance": 1.0, "duration": 1.0 }
            ] }"#,
        )
        .expect("json");
        let leg = dto.into_leg().expect("leg");
        assert!((leg.distance_meters - 15_420.3).abs() < 1e-9);
    }

    #[rstest]
    #[case(r#"{ "code": "NoRoute", "message": "No route found" }"#, true)]
    #[case(r#"{ "code": "InvalidInput", "message": "bad coordinates" }"#, false)]
    fn failure_codes_are_classified(#[case] body: &str, #[case] no_match: bool) {
        let dto: DirectionsResponseDto = serde_json::from_str(body).expect("json");
        let err = dto.into_leg().expect_err("failure code");
        assert_eq!(matches!(err, RouteProviderError::NoMatch { .. }), no_match);
    }
}
