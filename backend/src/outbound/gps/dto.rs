//! DTOs for the GPS vendor's device and position listings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::domain::{CarPlate, Coordinates, GpsDevice, PositionSample};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeviceDto {
    pub(super) id: i64,
    pub(super) name: String,
    #[serde(default)]
    pub(super) attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PositionDto {
    pub(super) device_id: i64,
    pub(super) fix_time: DateTime<Utc>,
    pub(super) latitude: f64,
    pub(super) longitude: f64,
    #[serde(default = "default_valid")]
    pub(super) valid: bool,
}

const fn default_valid() -> bool {
    true
}

const PLATE_ATTRIBUTES: [&str; 3] = ["carPlate", "plate", "licensePlate"];

impl DeviceDto {
    /// Plate from a device attribute, falling back to the device name when
    /// the name itself is a plate.
    fn car_plate(&self) -> Option<CarPlate> {
        PLATE_ATTRIBUTES
            .iter()
            .filter_map(|key| self.attributes.get(*key).and_then(serde_json::Value::as_str))
            .chain(std::iter::once(self.name.as_str()))
            .find_map(|candidate| CarPlate::new(candidate).ok())
    }

    pub(super) fn into_domain(self) -> GpsDevice {
        GpsDevice {
            car_plate: self.car_plate(),
            id: self.id,
            name: self.name,
        }
    }
}

/// Keep valid fixes with usable coordinates; log and drop the rest.
pub(super) fn into_samples(positions: Vec<PositionDto>) -> Vec<PositionSample> {
    positions
        .into_iter()
        .filter(|position| position.valid)
        .filter_map(|position| {
            match Coordinates::new(position.latitude, position.longitude) {
                Ok(coords) => Some(PositionSample {
                    device_id: position.device_id,
                    fixed_at: position.fix_time,
                    position: coords,
                }),
                Err(err) => {
                    warn!(
                        device_id = position.device_id,
                        fixed_at = %position.fix_time,
                        error = %err,
                        "dropping GPS position with invalid coordinates"
                    );
                    None
                }
            }
        })
        .collect()
}
