//! Localities, stores and geographic coordinates.

use serde::{Deserialize, Serialize};

use super::{LocalityId, StoreId};

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Validation errors for location types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationValidationError {
    #[error("latitude must be a finite value between -90 and 90, got {0}")]
    Latitude(f64),
    #[error("longitude must be a finite value between -180 and 180, got {0}")]
    Longitude(f64),
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    ///
    /// # Examples
    /// ```
    /// use fleet_backend::domain::Coordinates;
    ///
    /// assert!(Coordinates::new(44.5, 26.0).is_ok());
    /// assert!(Coordinates::new(91.0, 26.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationValidationError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationValidationError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_meters(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }

    /// `"lat,lng"` form used by the mapping providers.
    pub fn to_lat_lng_string(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, LocationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LocationValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Town or village an assignment travels to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locality {
    id: LocalityId,
    name: String,
    county: String,
    coordinates: Option<Coordinates>,
}

impl Locality {
    /// Validate and construct a locality.
    pub fn new(
        id: LocalityId,
        name: impl Into<String>,
        county: impl Into<String>,
        coordinates: Option<Coordinates>,
    ) -> Result<Self, LocationValidationError> {
        Ok(Self {
            id,
            name: non_empty("name", name.into())?,
            county: non_empty("county", county.into())?,
            coordinates,
        })
    }

    pub fn id(&self) -> LocalityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn county(&self) -> &str {
        &self.county
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}

/// Input for [`Store::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDraft {
    pub id: StoreId,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub locality_id: LocalityId,
    pub coordinates: Option<Coordinates>,
}

/// Retail location serviced by assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    id: StoreId,
    code: String,
    name: String,
    address: Option<String>,
    locality_id: LocalityId,
    coordinates: Option<Coordinates>,
}

impl Store {
    /// Validate and construct a store.
    pub fn new(draft: StoreDraft) -> Result<Self, LocationValidationError> {
        let StoreDraft {
            id,
            code,
            name,
            address,
            locality_id,
            coordinates,
        } = draft;
        let address = address
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        Ok(Self {
            id,
            code: non_empty("code", code)?,
            name: non_empty("name", name)?,
            address,
            locality_id,
            coordinates,
        })
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn locality_id(&self) -> LocalityId {
        self.locality_id
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}
