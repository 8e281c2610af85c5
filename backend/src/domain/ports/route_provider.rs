//! Driven ports for geocoding and driving directions.
//!
//! Adapters wrap third-party mapping APIs. Both ports share one error type so
//! the route service can map provider failures uniformly.

use async_trait::async_trait;

use crate::domain::{Coordinates, RouteLeg};

use super::define_port_error;

define_port_error! {
    /// Failures reported by mapping providers.
    pub enum RouteProviderError {
        /// Transport failure, timeout or upstream outage.
        Unavailable { message: String } => "route provider unavailable: {message}",
        /// The provider found no geocoding match or no route.
        NoMatch { message: String } => "route provider found no result: {message}",
        /// The provider refused the request (bad key, quota, malformed query).
        Rejected { message: String } => "route provider rejected request: {message}",
        /// Response body did not match the expected shape.
        Decode { message: String } => "route provider returned malformed data: {message}",
    }
}

/// Resolves free-text addresses to coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Coordinates, RouteProviderError>;
}

/// Computes a one-way driving leg between two points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteLeg, RouteProviderError>;
}
