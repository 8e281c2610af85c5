//! Vehicles, GPS presence samples and depot trip inference.
//!
//! Presence samples are classified against a circular depot geofence. A trip
//! is read from the ordered samples of one vehicle inside a window of local
//! calendar days: it departs with the first sample away from the depot and
//! returns with the first depot sample that follows the last away sample.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Validation errors for vehicle types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VehicleValidationError {
    #[error("car plate `{0}` is not a valid registration number")]
    InvalidPlate(String),
    #[error("depot radius must be a positive number of metres, got {0}")]
    InvalidRadius(f64),
    #[error("window end {end} is before start {start}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },
    #[error("window end {0} is out of range")]
    WindowOutOfRange(NaiveDate),
}

static PLATE_RE: OnceLock<Regex> = OnceLock::new();

fn plate_regex() -> &'static Regex {
    PLATE_RE.get_or_init(|| {
        Regex::new(r"^[A-Z]{1,2}[0-9]{2,3}[A-Z]{3}$")
            .unwrap_or_else(|error| panic!("plate regex failed to compile: {error}"))
    })
}

/// Normalised vehicle registration number, e.g. `B123ABC` or `IF65XOX`.
///
/// # Examples
/// ```
/// use fleet_backend::domain::CarPlate;
///
/// let plate = CarPlate::new("if-65 xox").expect("valid plate");
/// assert_eq!(plate.as_ref(), "IF65XOX");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarPlate(String);

impl CarPlate {
    /// Normalise (upper case, no spaces or dashes) and validate a plate.
    pub fn new(value: impl AsRef<str>) -> Result<Self, VehicleValidationError> {
        let raw = value.as_ref();
        let normalised: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_uppercase)
            .collect();
        if !plate_regex().is_match(&normalised) {
            return Err(VehicleValidationError::InvalidPlate(raw.trim().to_owned()));
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for CarPlate {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CarPlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CarPlate> for String {
    fn from(value: CarPlate) -> Self {
        value.0
    }
}

impl TryFrom<String> for CarPlate {
    type Error = VehicleValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Circular geofence around the depot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepotGeofence {
    center: Coordinates,
    radius_meters: f64,
}

impl DepotGeofence {
    pub fn new(center: Coordinates, radius_meters: f64) -> Result<Self, VehicleValidationError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(VehicleValidationError::InvalidRadius(radius_meters));
        }
        Ok(Self {
            center,
            radius_meters,
        })
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Classify a position against the geofence.
    pub fn classify(
        &self,
        car_plate: CarPlate,
        recorded_at: DateTime<Utc>,
        position: Coordinates,
    ) -> VehiclePresence {
        let distance = self.center.distance_meters(&position);
        VehiclePresence {
            car_plate,
            recorded_at,
            position,
            distance_to_depot_meters: distance,
            at_depot: distance <= self.radius_meters,
        }
    }
}

/// Tracked vehicle as reported by the GPS feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpsDevice {
    pub id: i64,
    pub name: String,
    pub car_plate: Option<CarPlate>,
}

/// Raw position reported by the GPS feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub device_id: i64,
    pub fixed_at: DateTime<Utc>,
    pub position: Coordinates,
}

/// Position sample classified against the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePresence {
    pub car_plate: CarPlate,
    pub recorded_at: DateTime<Utc>,
    pub position: Coordinates,
    pub distance_to_depot_meters: f64,
    pub at_depot: bool,
}

/// Half-open UTC interval covering whole local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDayWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl LocalDayWindow {
    /// `[start 00:00, end + 1 day 00:00)` in local time, expressed in UTC.
    ///
    /// # Examples
    /// ```
    /// use chrono::{FixedOffset, NaiveDate};
    /// use fleet_backend::domain::LocalDayWindow;
    ///
    /// let day = NaiveDate::from_ymd_opt(2025, 3, 10).expect("date");
    /// let offset = FixedOffset::east_opt(3 * 3600).expect("offset");
    /// let window = LocalDayWindow::new(day, day, offset).expect("window");
    /// assert_eq!(window.from.to_rfc3339(), "2025-03-09T21:00:00+00:00");
    /// assert_eq!(window.to.to_rfc3339(), "2025-03-10T21:00:00+00:00");
    /// ```
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self, VehicleValidationError> {
        if end < start {
            return Err(VehicleValidationError::InvertedWindow { start, end });
        }
        let after_end = end
            .checked_add_days(Days::new(1))
            .ok_or(VehicleValidationError::WindowOutOfRange(end))?;
        Ok(Self {
            from: local_midnight_utc(start, offset),
            to: local_midnight_utc(after_end, offset),
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

fn local_midnight_utc(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(local - shift, Utc)
}

/// Departure and return inferred from presence samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripTimes {
    pub departure_at: DateTime<Utc>,
    pub return_at: Option<DateTime<Utc>>,
}

/// Infer a depot round trip from samples of a single vehicle.
///
/// Samples need not be sorted. Returns `None` when the vehicle never left the
/// depot; `return_at` is `None` when it has not come back yet.
pub fn infer_trip_times(samples: &[VehiclePresence]) -> Option<TripTimes> {
    let mut ordered: Vec<&VehiclePresence> = samples.iter().collect();
    ordered.sort_by_key(|sample| sample.recorded_at);

    let departure_at = ordered
        .iter()
        .find(|sample| !sample.at_depot)
        .map(|sample| sample.recorded_at)?;
    let last_away = ordered
        .iter()
        .rev()
        .find(|sample| !sample.at_depot)
        .map(|sample| sample.recorded_at)?;
    let return_at = ordered
        .iter()
        .find(|sample| sample.at_depot && sample.recorded_at > last_away)
        .map(|sample| sample.recorded_at);

    Some(TripTimes {
        departure_at,
        return_at,
    })
}
