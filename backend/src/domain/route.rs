//! Driving route figures and unit conversions.

use serde::{Deserialize, Serialize};

/// Raw leg figures returned by a directions provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// Rounded route figures used by assignments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimate {
    pub one_way_km: f64,
    pub round_trip_km: f64,
    pub one_way_minutes: i32,
}

impl RouteEstimate {
    /// Convert a one-way leg into rounded figures.
    ///
    /// # Examples
    /// ```
    /// use fleet_backend::domain::{RouteEstimate, RouteLeg};
    ///
    /// let estimate = RouteEstimate::from_leg(RouteLeg {
    ///     distance_meters: 15_449.0,
    ///     duration_seconds: 1_201.0,
    /// });
    /// assert_eq!(estimate.one_way_km, 15.4);
    /// assert_eq!(estimate.round_trip_km, 30.8);
    /// assert_eq!(estimate.one_way_minutes, 21);
    /// ```
    pub fn from_leg(leg: RouteLeg) -> Self {
        let one_way_km = meters_to_km(leg.distance_meters);
        Self {
            one_way_km,
            round_trip_km: one_way_km * 2.0,
            one_way_minutes: seconds_to_minutes(leg.duration_seconds),
        }
    }
}

/// Kilometres rounded to one decimal.
pub fn meters_to_km(meters: f64) -> f64 {
    (meters / 100.0).round() / 10.0
}

/// Whole minutes, rounded up.
pub fn seconds_to_minutes(seconds: f64) -> i32 {
    let minutes = (seconds.max(0.0) / 60.0).ceil();
    if minutes >= f64::from(i32::MAX) {
        i32::MAX
    } else {
        // Bounded above; non-negative by construction.
        minutes as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1_049.0, 1.0)]
    #[case(1_050.0, 1.1)]
    #[case(123_456.0, 123.5)]
    fn meters_round_to_one_decimal(#[case] meters: f64, #[case] expected: f64) {
        assert!((meters_to_km(meters) - expected).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.0, 1)]
    #[case(60.0, 1)]
    #[case(61.0, 2)]
    fn seconds_round_up_to_minutes(#[case] seconds: f64, #[case] expected: i32) {
        assert_eq!(seconds_to_minutes(seconds), expected);
    }

    #[rstest]
    fn round_trip_doubles_the_rounded_one_way_distance() {
        let estimate = RouteEstimate::from_leg(RouteLeg {
            distance_meters: 10_030.0,
            duration_seconds: 600.0,
        });
        assert!((estimate.one_way_km - 10.0).abs() < 1e-9);
        assert!((estimate.round_trip_km - 20.0).abs() < 1e-9);
        assert_eq!(estimate.one_way_minutes, 10);
    }
}
