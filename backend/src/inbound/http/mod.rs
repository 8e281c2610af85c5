//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod assignments;
pub mod dashboard;
pub mod error;
pub mod gps;
pub mod health;
pub mod locations;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod work_logs;

pub use error::ApiResult;
