//! Embedded PostgreSQL for repository integration tests.
//!
//! One cluster is shared by the whole test binary. Every test gets its own
//! database cloned from a template that already carries the migrations; the
//! template name embeds a hash of `backend/migrations` so a schema change
//! provisions a fresh template instead of reusing a stale one.
//!
//! None of these helpers may run inside a Tokio runtime: the cluster API
//! blocks, and migrations are driven through the caller's runtime.

use std::path::PathBuf;
use std::sync::{Mutex, Once, OnceLock};
use std::time::Duration;

use fleet_backend::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;
use uuid::Uuid;

const TEMPLATE_NAME_PREFIX: &str = "fleet_template";
const STABLE_PASSWORD: &str = "fleet_embedded_test";
const PROVISION_RETRIES: usize = 3;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static STABLE_PASSWORD_INIT: Once = Once::new();

/// Pins `PG_PASSWORD` so a data directory left by an earlier run still
/// accepts the credentials this run connects with.
fn ensure_stable_password() {
    STABLE_PASSWORD_INIT.call_once(|| {
        if std::env::var_os("PG_PASSWORD").is_none() {
            // SAFETY: runs once, before the cluster library reads the
            // environment or spawns its own threads.
            unsafe {
                std::env::set_var("PG_PASSWORD", STABLE_PASSWORD);
            }
        }
    });
}

/// Starts (or reuses) the cluster shared by this test binary.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    shared_cluster_handle().map_err(|err| err.to_string())
}

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn ensure_template_database(cluster: &ClusterHandle, runtime: &Runtime) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template_name);
        runtime
            .block_on(run_pending_migrations(&url))
            .map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(template_name)
}

/// Provisions a migrated database private to one test.
///
/// Template creation can race with other test binaries sharing the cluster,
/// so provisioning is retried a few times before giving up.
pub fn provision_database(
    cluster: &ClusterHandle,
    runtime: &Runtime,
) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("no provisioning attempt made");
    for attempt in 1..=PROVISION_RETRIES {
        let result = ensure_template_database(cluster, runtime).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone template: {err:?}"))
        });
        match result {
            Ok(database) => return Ok(database),
            Err(error) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {error}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}
