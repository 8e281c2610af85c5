//! Port abstraction for stored GPS presence samples.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CarPlate, VehiclePresence};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by vehicle presence adapters.
    pub enum VehiclePresenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "vehicle presence connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "vehicle presence query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VehiclePresenceRepository: Send + Sync {
    /// Insert samples, skipping any `(car_plate, recorded_at)` already stored.
    /// Returns the number of new rows.
    async fn upsert(&self, samples: &[VehiclePresence]) -> Result<usize, VehiclePresenceError>;

    /// Samples recorded in `[from, to)`, oldest first.
    async fn list(
        &self,
        car_plate: &CarPlate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<VehiclePresence>, VehiclePresenceError>;
}
