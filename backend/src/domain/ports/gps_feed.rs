//! Driven port for the vendor GPS telemetry feed.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{GpsDevice, PositionSample};

use super::define_port_error;

define_port_error! {
    /// Failures reported by GPS feed adapters.
    pub enum GpsFeedError {
        /// Transport failure, timeout or upstream outage.
        Unavailable { message: String } => "gps feed unavailable: {message}",
        /// Credentials or request refused by the vendor.
        Rejected { message: String } => "gps feed rejected request: {message}",
        /// Response body did not match the expected shape.
        Decode { message: String } => "gps feed returned malformed data: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GpsFeed: Send + Sync {
    /// Vehicles known to the vendor.
    async fn list_devices(&self) -> Result<Vec<GpsDevice>, GpsFeedError>;

    /// Positions reported by `device_id` in `[from, to]`.
    async fn positions(
        &self,
        device_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PositionSample>, GpsFeedError>;
}
