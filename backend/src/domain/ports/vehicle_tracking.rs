//! Driving port for GPS ingestion and trip time inference.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Assignment, AssignmentId, CarPlate, Error, GpsDevice, TripTimes, VehiclePresence,
};

/// Result of ingesting positions for one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSyncReport {
    pub car_plate: CarPlate,
    pub device_id: i64,
    pub fetched: usize,
    pub inserted: usize,
}

/// Outcome of applying inferred trip times to an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripTimesApplied {
    pub assignment: Assignment,
    pub trip: Option<TripTimes>,
    pub changed: bool,
}

/// Presence samples and inference outcome for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDebugReport {
    pub car_plate: CarPlate,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub at_depot_count: usize,
    pub away_count: usize,
    pub trip: Option<TripTimes>,
    pub samples: Vec<VehiclePresence>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehicleTracking: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<GpsDevice>, Error>;

    /// Fetch positions for the vehicle in `[from, to]` and store them as
    /// presence samples.
    async fn sync_presence(
        &self,
        car_plate: CarPlate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PresenceSyncReport, Error>;

    /// Infer a trip over whole local days `start..=end`.
    async fn infer_trip_times(
        &self,
        car_plate: CarPlate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<TripTimes>, Error>;

    /// Fill the assignment's departure and return; overwrite when `force`.
    async fn apply_trip_times(
        &self,
        id: AssignmentId,
        force: bool,
    ) -> Result<TripTimesApplied, Error>;

    async fn debug_vehicle(
        &self,
        car_plate: CarPlate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<VehicleDebugReport, Error>;
}
