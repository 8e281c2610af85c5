//! Backend entry-point: loads settings, migrates the database and serves
//! the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fleet_backend::inbound::http::health::HealthState;
use fleet_backend::outbound::persistence::{DbPool, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let pool_config = settings.pool_config()?;
    let adapters = settings.adapter_settings()?;
    let bind_addr = settings.bind_addr()?;

    let applied = run_pending_migrations(pool_config.database_url())
        .await
        .wrap_err("failed to run database migrations")?;
    info!(count = applied.len(), migrations = ?applied, "database migrations applied");

    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to create database pool")?;

    let config = ServerConfig::new(bind_addr, pool, adapters);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(
        server::build_prometheus()
            .map_err(|err| color_eyre::eyre::eyre!("failed to configure Prometheus: {err}"))?,
    ));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");
    server.await?;
    health_state.mark_draining();
    Ok(())
}
