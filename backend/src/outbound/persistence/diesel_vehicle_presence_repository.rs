//! PostgreSQL-backed store of classified GPS samples.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{VehiclePresenceError, VehiclePresenceRepository};
use crate::domain::{CarPlate, Coordinates, VehiclePresence};

use super::diesel_error_mapping::{collect_rows, map_basic_diesel_error, map_pool_error};
use super::models::{NewVehiclePresenceRow, VehiclePresenceRow};
use super::pool::DbPool;
use super::schema::vehicle_presence;

/// Rows per INSERT; six binds each keeps well under the PostgreSQL limit.
const INSERT_CHUNK: usize = 1_000;

/// Diesel implementation of [`VehiclePresenceRepository`].
#[derive(Clone)]
pub struct DieselVehiclePresenceRepository {
    pool: DbPool,
}

impl DieselVehiclePresenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> VehiclePresenceError {
    map_basic_diesel_error(
        error,
        VehiclePresenceError::query,
        VehiclePresenceError::connection,
    )
}

fn row_to_presence(row: VehiclePresenceRow) -> Result<VehiclePresence, String> {
    Ok(VehiclePresence {
        car_plate: CarPlate::new(&row.car_plate).map_err(|err| err.to_string())?,
        recorded_at: row.recorded_at,
        position: Coordinates::new(row.latitude, row.longitude).map_err(|err| err.to_string())?,
        distance_to_depot_meters: row.distance_to_depot_m,
        at_depot: row.at_depot,
    })
}

fn presence_row(sample: &VehiclePresence) -> NewVehiclePresenceRow<'_> {
    NewVehiclePresenceRow {
        car_plate: sample.car_plate.as_ref(),
        recorded_at: sample.recorded_at,
        latitude: sample.position.latitude(),
        longitude: sample.position.longitude(),
        distance_to_depot_m: sample.distance_to_depot_meters,
        at_depot: sample.at_depot,
    }
}

#[async_trait]
impl VehiclePresenceRepository for DieselVehiclePresenceRepository {
    async fn upsert(&self, samples: &[VehiclePresence]) -> Result<usize, VehiclePresenceError> {
        if samples.is_empty() {
            return Ok(0);
        }
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, VehiclePresenceError::connection))?;

        let mut inserted = 0;
        for chunk in samples.chunks(INSERT_CHUNK) {
            let rows: Vec<NewVehiclePresenceRow<'_>> = chunk.iter().map(presence_row).collect();
            inserted += diesel::insert_into(vehicle_presence::table)
                .values(&rows)
                .on_conflict((vehicle_presence::car_plate, vehicle_presence::recorded_at))
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        }
        Ok(inserted)
    }

    async fn list(
        &self,
        car_plate: &CarPlate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<VehiclePresence>, VehiclePresenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, VehiclePresenceError::connection))?;

        let rows: Vec<VehiclePresenceRow> = vehicle_presence::table
            .filter(vehicle_presence::car_plate.eq(car_plate.as_ref()))
            .filter(vehicle_presence::recorded_at.ge(from))
            .filter(vehicle_presence::recorded_at.lt(to))
            .order_by(vehicle_presence::recorded_at)
            .select(VehiclePresenceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_presence, VehiclePresenceError::query)
    }
}
