//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between Diesel rows (`models`) and domain
//! entities; no business rules live here. Connections come from a `bb8`
//! pool of `diesel-async` connections, and every multi-statement write runs
//! inside a transaction.
//!
//! # Example
//!
//! ```no_run
//! use fleet_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/fleet")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_assignment_repository;
mod diesel_dashboard_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_location_repository;
mod diesel_status_sync_repository;
mod diesel_user_repository;
mod diesel_vehicle_presence_repository;
mod diesel_work_log_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use diesel_dashboard_repository::DieselDashboardRepository;
pub use diesel_location_repository::DieselLocationRepository;
pub use diesel_status_sync_repository::DieselStatusSyncRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vehicle_presence_repository::DieselVehiclePresenceRepository;
pub use diesel_work_log_repository::DieselWorkLogRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
