//! Shared helpers for the backend integration tests.

pub mod embedded_postgres;

pub use embedded_postgres::{provision_database, shared_cluster};

/// Returns true when `SKIP_TEST_CLUSTER` is `1`, `true` or `yes`
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles embedded cluster setup failures consistently.
///
/// Returns `None` with a skip marker when `SKIP_TEST_CLUSTER` is truthy and
/// panics otherwise so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
