//! Driving port for route estimates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Assignment, AssignmentId, Coordinates, Error, RouteEstimate};

/// Resolved endpoints and figures of an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEstimateResponse {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub estimate: RouteEstimate,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteCalculation: Send + Sync {
    /// Estimate a trip between two addresses; the origin defaults to the depot.
    async fn estimate_route(
        &self,
        origin: Option<String>,
        destination: String,
    ) -> Result<RouteEstimateResponse, Error>;

    /// Recompute and persist the assignment's distance and travel time.
    async fn recalculate_assignment_route(&self, id: AssignmentId) -> Result<Assignment, Error>;
}
