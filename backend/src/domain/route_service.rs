//! Route estimation service.
//!
//! Trips start at the depot unless the caller names another origin. When an
//! assignment is recalculated the destination is resolved from the most
//! precise data available: store coordinates, then locality coordinates,
//! then a geocoded address.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::assignment_service::{
    assignment_not_found, map_assignment_repository_error, map_location_repository_error,
};
use crate::domain::ports::{
    AssignmentRepository, DirectionsProvider, Geocoder, LocationRepository, RouteCalculation,
    RouteEstimateResponse, RouteProviderError,
};
use crate::domain::{
    Assignment, AssignmentId, Coordinates, Error, Locality, RouteEstimate, Store,
};

const COUNTRY: &str = "Romania";

pub(crate) fn map_route_provider_error(error: RouteProviderError) -> Error {
    match error {
        RouteProviderError::Unavailable { message } => {
            Error::service_unavailable(format!("mapping provider unavailable: {message}"))
        }
        RouteProviderError::NoMatch { message } => {
            Error::not_found(format!("no route found: {message}"))
        }
        RouteProviderError::Rejected { message } => {
            Error::internal(format!("mapping provider rejected request: {message}"))
        }
        RouteProviderError::Decode { message } => {
            Error::internal(format!("mapping provider returned malformed data: {message}"))
        }
    }
}

/// Free-text address used when no coordinates are stored.
pub fn destination_query(locality: &Locality, store: Option<&Store>) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if let Some(address) = store.and_then(Store::address) {
        parts.push(address);
    }
    parts.push(locality.name());
    parts.push(locality.county());
    parts.push(COUNTRY);
    parts.join(", ")
}

/// Service implementing [`RouteCalculation`].
#[derive(Clone)]
pub struct RouteService<A, L> {
    geocoder: Arc<dyn Geocoder>,
    directions: Arc<dyn DirectionsProvider>,
    assignment_repo: Arc<A>,
    location_repo: Arc<L>,
    depot: Coordinates,
}

impl<A, L> RouteService<A, L> {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        directions: Arc<dyn DirectionsProvider>,
        assignment_repo: Arc<A>,
        location_repo: Arc<L>,
        depot: Coordinates,
    ) -> Self {
        Self {
            geocoder,
            directions,
            assignment_repo,
            location_repo,
            depot,
        }
    }
}

impl<A, L> RouteService<A, L>
where
    A: AssignmentRepository,
    L: LocationRepository,
{
    async fn geocode(&self, query: &str) -> Result<Coordinates, Error> {
        let coordinates = self
            .geocoder
            .geocode(query)
            .await
            .map_err(map_route_provider_error)?;
        debug!(query, lat = coordinates.latitude(), lng = coordinates.longitude(), "geocoded");
        Ok(coordinates)
    }

    async fn estimate_between(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteEstimate, Error> {
        let leg = self
            .directions
            .directions(origin, destination)
            .await
            .map_err(map_route_provider_error)?;
        Ok(RouteEstimate::from_leg(leg))
    }

    async fn resolve_destination(&self, assignment: &Assignment) -> Result<Coordinates, Error> {
        let locality = self
            .location_repo
            .find_locality(&assignment.locality_id())
            .await
            .map_err(map_location_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("locality {} not found", assignment.locality_id()))
            })?;
        let store = match assignment.store_id() {
            Some(store_id) => self
                .location_repo
                .find_store(&store_id)
                .await
                .map_err(map_location_repository_error)?,
            None => None,
        };

        if let Some(coordinates) = store
            .as_ref()
            .and_then(Store::coordinates)
            .or_else(|| locality.coordinates())
        {
            return Ok(coordinates);
        }
        self.geocode(&destination_query(&locality, store.as_ref()))
            .await
    }
}

#[async_trait]
impl<A, L> RouteCalculation for RouteService<A, L>
where
    A: AssignmentRepository,
    L: LocationRepository,
{
    async fn estimate_route(
        &self,
        origin: Option<String>,
        destination: String,
    ) -> Result<RouteEstimateResponse, Error> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(Error::invalid_request("destination must not be empty"));
        }
        let origin = match origin.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => self.geocode(query).await?,
            None => self.depot,
        };
        let destination = self.geocode(destination).await?;
        let estimate = self.estimate_between(origin, destination).await?;
        Ok(RouteEstimateResponse {
            origin,
            destination,
            estimate,
        })
    }

    async fn recalculate_assignment_route(&self, id: AssignmentId) -> Result<Assignment, Error> {
        let assignment = self
            .assignment_repo
            .find_by_id(&id)
            .await
            .map_err(map_assignment_repository_error)?
            .ok_or_else(|| assignment_not_found(id))?;
        let destination = self.resolve_destination(&assignment).await?;
        let estimate = self.estimate_between(self.depot, destination).await?;
        let updated = assignment.with_route(&estimate);

        let stored = self
            .assignment_repo
            .update(&updated)
            .await
            .map_err(map_assignment_repository_error)?;
        if !stored {
            return Err(assignment_not_found(id));
        }
        info!(
            assignment_id = %id,
            round_trip_km = estimate.round_trip_km,
            one_way_minutes = estimate.one_way_minutes,
            "assignment route recalculated"
        );
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "route_service_tests.rs"]
mod tests;
