//! Driving port for localities and stores.

use async_trait::async_trait;

use crate::domain::{Coordinates, Error, Locality, LocalityId, Store};

/// Input for creating a locality.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocality {
    pub name: String,
    pub county: String,
    pub coordinates: Option<Coordinates>,
}

/// Input for creating a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub locality_id: LocalityId,
    pub coordinates: Option<Coordinates>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Locations: Send + Sync {
    async fn list_localities(&self, search: Option<String>) -> Result<Vec<Locality>, Error>;

    async fn create_locality(&self, request: NewLocality) -> Result<Locality, Error>;

    async fn list_stores(&self, locality_id: Option<LocalityId>) -> Result<Vec<Store>, Error>;

    /// The locality must exist; store codes are unique.
    async fn create_store(&self, request: NewStore) -> Result<Store, Error>;
}
