//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel.
//! - **google** / **mapbox**: geocoding and directions providers.
//! - **gps**: the vendor GPS telemetry feed.
//!
//! Adapters translate between wire or row formats and domain types and
//! contain no business rules.

pub mod google;
pub mod gps;
pub(crate) mod http_support;
pub mod mapbox;
pub mod persistence;

pub use http_support::HttpClientError;
