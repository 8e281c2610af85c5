//! Port abstraction for locality and store persistence.
use async_trait::async_trait;

use crate::domain::{Locality, LocalityId, Store, StoreId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by location repository adapters.
    pub enum LocationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "location repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "location repository query failed: {message}",
        /// A unique key is already taken.
        Duplicate { message: String } => "location already exists: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Localities ordered by name, optionally filtered by a case-insensitive
    /// substring of name or county.
    async fn list_localities(
        &self,
        search: Option<String>,
    ) -> Result<Vec<Locality>, LocationPersistenceError>;

    async fn find_locality(
        &self,
        id: &LocalityId,
    ) -> Result<Option<Locality>, LocationPersistenceError>;

    async fn insert_locality(&self, locality: &Locality) -> Result<(), LocationPersistenceError>;

    /// Stores ordered by code, optionally restricted to one locality.
    async fn list_stores(
        &self,
        locality_id: Option<LocalityId>,
    ) -> Result<Vec<Store>, LocationPersistenceError>;

    async fn find_store(&self, id: &StoreId) -> Result<Option<Store>, LocationPersistenceError>;

    async fn insert_store(&self, store: &Store) -> Result<(), LocationPersistenceError>;
}
