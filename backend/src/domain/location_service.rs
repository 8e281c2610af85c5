//! Locality and store service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::assignment_service::map_location_repository_error;
use crate::domain::ports::{LocationRepository, Locations, NewLocality, NewStore};
use crate::domain::{
    Error, Locality, LocalityId, LocationValidationError, Store, StoreDraft, StoreId,
};

fn map_validation_error(error: LocationValidationError) -> Error {
    let field = match &error {
        LocationValidationError::Latitude(_) => "latitude",
        LocationValidationError::Longitude(_) => "longitude",
        LocationValidationError::EmptyField { field } => *field,
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

/// Service implementing [`Locations`].
#[derive(Clone)]
pub struct LocationService<R> {
    repo: Arc<R>,
}

impl<R> LocationService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> Locations for LocationService<R>
where
    R: LocationRepository,
{
    async fn list_localities(&self, search: Option<String>) -> Result<Vec<Locality>, Error> {
        let search = search
            .map(|term| term.trim().to_owned())
            .filter(|term| !term.is_empty());
        self.repo
            .list_localities(search)
            .await
            .map_err(map_location_repository_error)
    }

    async fn create_locality(&self, request: NewLocality) -> Result<Locality, Error> {
        let locality = Locality::new(
            LocalityId::random(),
            request.name,
            request.county,
            request.coordinates,
        )
        .map_err(map_validation_error)?;
        self.repo
            .insert_locality(&locality)
            .await
            .map_err(map_location_repository_error)?;
        info!(locality_id = %locality.id(), name = locality.name(), "locality created");
        Ok(locality)
    }

    async fn list_stores(&self, locality_id: Option<LocalityId>) -> Result<Vec<Store>, Error> {
        self.repo
            .list_stores(locality_id)
            .await
            .map_err(map_location_repository_error)
    }

    async fn create_store(&self, request: NewStore) -> Result<Store, Error> {
        let store = Store::new(StoreDraft {
            id: StoreId::random(),
            code: request.code,
            name: request.name,
            address: request.address,
            locality_id: request.locality_id,
            coordinates: request.coordinates,
        })
        .map_err(map_validation_error)?;

        let locality = self
            .repo
            .find_locality(&store.locality_id())
            .await
            .map_err(map_location_repository_error)?;
        if locality.is_none() {
            return Err(Error::invalid_request(format!(
                "locality {} does not exist",
                store.locality_id()
            ))
            .with_details(json!({ "field": "localityId", "code": "unknown_reference" })));
        }

        self.repo
            .insert_store(&store)
            .await
            .map_err(map_location_repository_error)?;
        info!(store_id = %store.id(), code = store.code(), "store created");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{LocationPersistenceError, MockLocationRepository};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn new_store(locality_id: LocalityId) -> NewStore {
        NewStore {
            code: "S-204".into(),
            name: "Chitila Nord".into(),
            address: Some("Str. Gării 1".into()),
            locality_id,
            coordinates: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn blank_search_lists_everything() {
        let mut repo = MockLocationRepository::new();
        repo.expect_list_localities()
            .with(eq(None::<String>))
            .return_once(|_| Ok(Vec::new()));
        LocationService::new(Arc::new(repo))
            .list_localities(Some("   ".into()))
            .await
            .expect("listed");
    }

    #[rstest]
    #[tokio::test]
    async fn blank_locality_name_is_rejected() {
        let mut repo = MockLocationRepository::new();
        repo.expect_insert_locality().never();
        let err = LocationService::new(Arc::new(repo))
            .create_locality(NewLocality {
                name: " ".into(),
                county: "Ilfov".into(),
                coordinates: None,
            })
            .await
            .expect_err("blank name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn store_requires_existing_locality() {
        let mut repo = MockLocationRepository::new();
        repo.expect_find_locality().return_once(|_| Ok(None));
        repo.expect_insert_store().never();
        let err = LocationService::new(Arc::new(repo))
            .create_store(new_store(LocalityId::random()))
            .await
            .expect_err("unknown locality");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_store_code_is_a_conflict() {
        let locality =
            Locality::new(LocalityId::random(), "Chitila", "Ilfov", None).expect("locality");
        let locality_id = locality.id();
        let mut repo = MockLocationRepository::new();
        repo.expect_find_locality()
            .return_once(move |_| Ok(Some(locality)));
        repo.expect_insert_store()
            .return_once(|_| Err(LocationPersistenceError::duplicate("store code S-204")));
        let err = LocationService::new(Arc::new(repo))
            .create_store(new_store(locality_id))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }
}
