//! Fleet assignment tracking backend.
//!
//! Hexagonal layout: [`domain`] holds entities, services and ports;
//! [`inbound`] adapts HTTP requests onto the driving ports; [`outbound`]
//! implements the driven ports with Diesel, the mapping providers and the
//! GPS feed.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
