//! PostgreSQL-backed `LocationRepository` for localities and stores.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LocationPersistenceError, LocationRepository};
use crate::domain::{Coordinates, Locality, LocalityId, Store, StoreDraft, StoreId};

use super::diesel_error_mapping::{
    DieselFailure, classify_diesel_error, collect_rows, map_pool_error,
};
use super::models::{LocalityRow, NewLocalityRow, NewStoreRow, StoreRow};
use super::pool::DbPool;
use super::schema::{localities, stores};

/// Diesel implementation of [`LocationRepository`].
#[derive(Clone)]
pub struct DieselLocationRepository {
    pool: DbPool,
}

impl DieselLocationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> LocationPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => LocationPersistenceError::connection(message),
        DieselFailure::Unique(message) => LocationPersistenceError::duplicate(message),
        DieselFailure::Query(message) | DieselFailure::ForeignKey(message) => {
            LocationPersistenceError::query(message)
        }
    }
}

/// Escape `ILIKE` wildcards and wrap the term for substring matching.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<Coordinates>, String> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
            .map(Some)
            .map_err(|err| err.to_string()),
        (None, None) => Ok(None),
        _ => Err("latitude and longitude must be stored together".to_owned()),
    }
}

fn row_to_locality(row: LocalityRow) -> Result<Locality, String> {
    let coords = coordinates(row.latitude, row.longitude)?;
    Locality::new(LocalityId::from_uuid(row.id), row.name, row.county, coords)
        .map_err(|err| err.to_string())
}

fn row_to_store(row: StoreRow) -> Result<Store, String> {
    let coords = coordinates(row.latitude, row.longitude)?;
    Store::new(StoreDraft {
        id: StoreId::from_uuid(row.id),
        code: row.code,
        name: row.name,
        address: row.address,
        locality_id: LocalityId::from_uuid(row.locality_id),
        coordinates: coords,
    })
    .map_err(|err| err.to_string())
}

#[async_trait]
impl LocationRepository for DieselLocationRepository {
    async fn list_localities(
        &self,
        search: Option<String>,
    ) -> Result<Vec<Locality>, LocationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, LocationPersistenceError::connection))?;

        let mut query = localities::table
            .select(LocalityRow::as_select())
            .into_boxed();
        if let Some(term) = search {
            let pattern = like_pattern(&term);
            query = query.filter(
                localities::name
                    .ilike(pattern.clone())
                    .or(localities::county.ilike(pattern)),
            );
        }
        let rows: Vec<LocalityRow> = query
            .order_by((localities::name, localities::county))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_locality, LocationPersistenceError::query)
    }

    async fn find_locality(
        &self,
        id: &LocalityId,
    ) -> Result<Option<Locality>, LocationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, LocationPersistenceError::connection))?;

        let row: Option<LocalityRow> = localities::table
            .find(id.as_uuid())
            .select(LocalityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_locality)
            .transpose()
            .map_err(LocationPersistenceError::query)
    }

    async fn insert_locality(&self, locality: &Locality) -> Result<(), LocationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, LocationPersistenceError::connection))?;

        let coords = locality.coordinates();
        let row = NewLocalityRow {
            id: *locality.id().as_uuid(),
            name: locality.name(),
            county: locality.county(),
            latitude: coords.map(|c| c.latitude()),
            longitude: coords.map(|c| c.longitude()),
        };
        diesel::insert_into(localities::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_stores(
        &self,
        locality_id: Option<LocalityId>,
    ) -> Result<Vec<Store>, LocationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, LocationPersistenceError::connection))?;

        let mut query = stores::table.select(StoreRow::as_select()).into_boxed();
        if let Some(locality) = locality_id {
            query = query.filter(stores::locality_id.eq(*locality.as_uuid()));
        }
        let rows: Vec<StoreRow> = query
            .order_by(stores::code)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows, row_to_store, LocationPersistenceError::query)
    }

    async fn find_store(&self, id: &StoreId) -> Result<Option<Store>, LocationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, LocationPersistenceError::connection))?;

        let row: Option<StoreRow> = stores::table
            .find(id.as_uuid())
            .select(StoreRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_store)
            .transpose()
            .map_err(LocationPersistenceError::query)
    }

    async fn insert_store(&self, store: &Store) -> Result<(), LocationPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, LocationPersistenceError::connection))?;

        let coords = store.coordinates();
        let row = NewStoreRow {
            id: *store.id().as_uuid(),
            code: store.code(),
            name: store.name(),
            address: store.address(),
            locality_id: *store.locality_id().as_uuid(),
            latitude: coords.map(|c| c.latitude()),
            longitude: coords.map(|c| c.longitude()),
        };
        diesel::insert_into(stores::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
