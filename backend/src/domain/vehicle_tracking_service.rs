//! GPS ingestion and trip time inference service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::domain::assignment_service::{assignment_not_found, map_assignment_repository_error};
use crate::domain::ports::{
    AssignmentRepository, GpsFeed, GpsFeedError, PresenceSyncReport, TripTimesApplied,
    VehicleDebugReport, VehiclePresenceError, VehiclePresenceRepository, VehicleTracking,
};
use crate::domain::{
    AssignmentId, CarPlate, DepotGeofence, Error, GpsDevice, LocalDayWindow, TripTimes,
    VehiclePresence, infer_trip_times,
};

fn map_gps_feed_error(error: GpsFeedError) -> Error {
    match error {
        GpsFeedError::Unavailable { message } => {
            Error::service_unavailable(format!("gps feed unavailable: {message}"))
        }
        GpsFeedError::Rejected { message } => {
            Error::internal(format!("gps feed rejected request: {message}"))
        }
        GpsFeedError::Decode { message } => {
            Error::internal(format!("gps feed returned malformed data: {message}"))
        }
    }
}

fn map_presence_error(error: VehiclePresenceError) -> Error {
    match error {
        VehiclePresenceError::Connection { message } => {
            Error::service_unavailable(format!("vehicle presence repository unavailable: {message}"))
        }
        VehiclePresenceError::Query { message } => {
            Error::internal(format!("vehicle presence repository error: {message}"))
        }
    }
}

/// Service implementing [`VehicleTracking`].
#[derive(Clone)]
pub struct VehicleTrackingService<P, A> {
    feed: Arc<dyn GpsFeed>,
    presence_repo: Arc<P>,
    assignment_repo: Arc<A>,
    geofence: DepotGeofence,
    local_offset: FixedOffset,
}

impl<P, A> VehicleTrackingService<P, A> {
    pub fn new(
        feed: Arc<dyn GpsFeed>,
        presence_repo: Arc<P>,
        assignment_repo: Arc<A>,
        geofence: DepotGeofence,
        local_offset: FixedOffset,
    ) -> Self {
        Self {
            feed,
            presence_repo,
            assignment_repo,
            geofence,
            local_offset,
        }
    }
}

impl<P, A> VehicleTrackingService<P, A>
where
    P: VehiclePresenceRepository,
    A: AssignmentRepository,
{
    fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<LocalDayWindow, Error> {
        LocalDayWindow::new(start, end, self.local_offset)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn samples(
        &self,
        car_plate: &CarPlate,
        window: LocalDayWindow,
    ) -> Result<Vec<VehiclePresence>, Error> {
        self.presence_repo
            .list(car_plate, window.from, window.to)
            .await
            .map_err(map_presence_error)
    }

    async fn find_device(&self, car_plate: &CarPlate) -> Result<GpsDevice, Error> {
        self.feed
            .list_devices()
            .await
            .map_err(map_gps_feed_error)?
            .into_iter()
            .find(|device| device.car_plate.as_ref() == Some(car_plate))
            .ok_or_else(|| Error::not_found(format!("no GPS device tracks {car_plate}")))
    }
}

#[async_trait]
impl<P, A> VehicleTracking for VehicleTrackingService<P, A>
where
    P: VehiclePresenceRepository,
    A: AssignmentRepository,
{
    async fn list_devices(&self) -> Result<Vec<GpsDevice>, Error> {
        self.feed.list_devices().await.map_err(map_gps_feed_error)
    }

    async fn sync_presence(
        &self,
        car_plate: CarPlate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PresenceSyncReport, Error> {
        if to < from {
            return Err(Error::invalid_request("`to` must not be before `from`")
                .with_details(json!({ "from": from, "to": to })));
        }
        let device = self.find_device(&car_plate).await?;
        let positions = self
            .feed
            .positions(device.id, from, to)
            .await
            .map_err(map_gps_feed_error)?;
        let samples: Vec<VehiclePresence> = positions
            .iter()
            .map(|p| {
                self.geofence
                    .classify(car_plate.clone(), p.fixed_at, p.position)
            })
            .collect();
        let inserted = self
            .presence_repo
            .upsert(&samples)
            .await
            .map_err(map_presence_error)?;
        info!(
            car_plate = %car_plate,
            device_id = device.id,
            fetched = samples.len(),
            inserted,
            "vehicle presence synchronised"
        );
        Ok(PresenceSyncReport {
            car_plate,
            device_id: device.id,
            fetched: samples.len(),
            inserted,
        })
    }

    async fn infer_trip_times(
        &self,
        car_plate: CarPlate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<TripTimes>, Error> {
        let window = self.window(start, end)?;
        let samples = self.samples(&car_plate, window).await?;
        Ok(infer_trip_times(&samples))
    }

    async fn apply_trip_times(
        &self,
        id: AssignmentId,
        force: bool,
    ) -> Result<TripTimesApplied, Error> {
        let mut assignment = self
            .assignment_repo
            .find_by_id(&id)
            .await
            .map_err(map_assignment_repository_error)?
            .ok_or_else(|| assignment_not_found(id))?;
        let car_plate = assignment.car_plate().cloned().ok_or_else(|| {
            Error::invalid_request(format!("assignment {id} has no car plate"))
                .with_details(json!({ "field": "carPlate", "code": "missing" }))
        })?;

        let trip = self
            .infer_trip_times(car_plate.clone(), assignment.start_date(), assignment.last_day())
            .await?;
        let Some(found) = trip else {
            warn!(assignment_id = %id, car_plate = %car_plate, "no trip found in GPS presence");
            return Ok(TripTimesApplied {
                assignment,
                trip: None,
                changed: false,
            });
        };

        let changed = assignment.apply_trip_times(&found, force);
        if changed {
            let stored = self
                .assignment_repo
                .update(&assignment)
                .await
                .map_err(map_assignment_repository_error)?;
            if !stored {
                return Err(assignment_not_found(id));
            }
            info!(assignment_id = %id, force, "trip times applied");
        }
        Ok(TripTimesApplied {
            assignment,
            trip,
            changed,
        })
    }

    async fn debug_vehicle(
        &self,
        car_plate: CarPlate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<VehicleDebugReport, Error> {
        let window = self.window(start, end)?;
        let samples = self.samples(&car_plate, window).await?;
        let at_depot_count = samples.iter().filter(|s| s.at_depot).count();
        Ok(VehicleDebugReport {
            car_plate,
            window_start: window.from,
            window_end: window.to,
            at_depot_count,
            away_count: samples.len() - at_depot_count,
            trip: infer_trip_times(&samples),
            samples,
        })
    }
}

#[cfg(test)]
#[path = "vehicle_tracking_service_tests.rs"]
mod tests;
