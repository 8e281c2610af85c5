//! Application settings loaded via OrthoConfig and the resolved server
//! configuration built from them.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use fleet_backend::domain::{
    Coordinates, DepotGeofence, LocationValidationError, VehicleValidationError,
};
use fleet_backend::outbound::persistence::{DbPool, PoolConfig};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_DEPOT_LATITUDE: f64 = 44.5086;
const DEFAULT_DEPOT_LONGITUDE: f64 = 25.9719;
const DEFAULT_DEPOT_RADIUS_M: f64 = 500.0;
// Romanian summer time.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 180;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Raw settings from `FLEET_*` variables, CLI flags and config files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FLEET")]
pub struct AppSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    pub db_pool_size: Option<u32>,
    /// `google` (default) or `mapbox`.
    pub route_provider: Option<String>,
    pub google_api_key: Option<String>,
    pub mapbox_token: Option<String>,
    /// Base URL of the GPS vendor REST API.
    pub gps_base_url: Option<String>,
    pub gps_token: Option<String>,
    pub depot_latitude: Option<f64>,
    pub depot_longitude: Option<f64>,
    /// Geofence radius around the depot, in metres.
    pub depot_radius_m: Option<f64>,
    /// Offset from UTC used for local calendar days.
    pub utc_offset_minutes: Option<i32>,
    /// Timeout for outbound provider and GPS requests.
    pub http_timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid bind address {value}: {message}")]
    BindAddr { value: String, message: String },
    #[error("unknown route provider {0}; expected google or mapbox")]
    RouteProvider(String),
    #[error("invalid depot coordinates: {0}")]
    DepotCoordinates(#[from] LocationValidationError),
    #[error("invalid depot geofence: {0}")]
    DepotGeofence(#[from] VehicleValidationError),
    #[error("UTC offset of {0} minutes is out of range")]
    UtcOffset(i32),
}

/// Mapping provider selection with its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteProviderSettings {
    Google { api_key: String },
    Mapbox { access_token: String },
}

/// Settings consumed by the outbound adapters and services.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub route_provider: RouteProviderSettings,
    pub gps_base_url: String,
    pub gps_token: String,
    pub geofence: DepotGeofence,
    pub local_offset: FixedOffset,
    pub http_timeout: Duration,
}

fn required(value: Option<&String>, name: &'static str) -> Result<String, SettingsError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(SettingsError::Missing(name))
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = required(self.database_url.as_ref(), "database_url")?;
        Ok(PoolConfig::new(url).with_max_size(self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)))
    }

    pub fn route_provider(&self) -> Result<RouteProviderSettings, SettingsError> {
        let provider = self
            .route_provider
            .as_deref()
            .map_or_else(|| "google".to_owned(), |p| p.trim().to_ascii_lowercase());
        match provider.as_str() {
            "google" => Ok(RouteProviderSettings::Google {
                api_key: required(self.google_api_key.as_ref(), "google_api_key")?,
            }),
            "mapbox" => Ok(RouteProviderSettings::Mapbox {
                access_token: required(self.mapbox_token.as_ref(), "mapbox_token")?,
            }),
            _ => Err(SettingsError::RouteProvider(provider)),
        }
    }

    pub fn geofence(&self) -> Result<DepotGeofence, SettingsError> {
        let center = Coordinates::new(
            self.depot_latitude.unwrap_or(DEFAULT_DEPOT_LATITUDE),
            self.depot_longitude.unwrap_or(DEFAULT_DEPOT_LONGITUDE),
        )?;
        Ok(DepotGeofence::new(
            center,
            self.depot_radius_m.unwrap_or(DEFAULT_DEPOT_RADIUS_M),
        )?)
    }

    pub fn local_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self.utc_offset_minutes.unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::UtcOffset(minutes))
    }

    pub fn adapter_settings(&self) -> Result<AdapterSettings, SettingsError> {
        Ok(AdapterSettings {
            route_provider: self.route_provider()?,
            gps_base_url: required(self.gps_base_url.as_ref(), "gps_base_url")?,
            gps_token: required(self.gps_token.as_ref(), "gps_token")?,
            geofence: self.geofence()?,
            local_offset: self.local_offset()?,
            http_timeout: Duration::from_secs(
                self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
        })
    }
}

/// Everything [`super::create_server`] needs to wire the application.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) adapters: AdapterSettings,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, adapters: AdapterSettings) -> Self {
        Self {
            bind_addr,
            db_pool,
            adapters,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 13] = [
        "FLEET_BIND_ADDR",
        "FLEET_DATABASE_URL",
        "FLEET_DB_POOL_SIZE",
        "FLEET_ROUTE_PROVIDER",
        "FLEET_GOOGLE_API_KEY",
        "FLEET_MAPBOX_TOKEN",
        "FLEET_GPS_BASE_URL",
        "FLEET_GPS_TOKEN",
        "FLEET_DEPOT_LATITUDE",
        "FLEET_DEPOT_LONGITUDE",
        "FLEET_DEPOT_RADIUS_M",
        "FLEET_UTC_OFFSET_MINUTES",
        "FLEET_HTTP_TIMEOUT_SECS",
    ];

    fn env_with(overrides: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("fleet-backend")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.local_offset().expect("offset"),
            FixedOffset::east_opt(3 * 3600).expect("offset")
        );
        let geofence = settings.geofence().expect("geofence");
        assert!((geofence.radius_meters() - DEFAULT_DEPOT_RADIUS_M).abs() < f64::EPSILON);
        assert!(matches!(
            settings.pool_config(),
            Err(SettingsError::Missing("database_url"))
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("FLEET_DATABASE_URL", "postgres://fleet@db/fleet"),
            ("FLEET_DB_POOL_SIZE", "4"),
            ("FLEET_ROUTE_PROVIDER", "Mapbox"),
            ("FLEET_MAPBOX_TOKEN", "pk.test"),
            ("FLEET_GPS_BASE_URL", "https://gps.example.test/api"),
            ("FLEET_GPS_TOKEN", "secret"),
            ("FLEET_UTC_OFFSET_MINUTES", "120"),
            ("FLEET_HTTP_TIMEOUT_SECS", "3"),
        ]));

        let settings = load();
        let pool = settings.pool_config().expect("pool config");
        assert_eq!(pool.database_url(), "postgres://fleet@db/fleet");
        assert_eq!(pool.max_size(), 4);

        let adapters = settings.adapter_settings().expect("adapter settings");
        assert_eq!(
            adapters.route_provider,
            RouteProviderSettings::Mapbox {
                access_token: "pk.test".into()
            }
        );
        assert_eq!(adapters.http_timeout, Duration::from_secs(3));
        assert_eq!(
            adapters.local_offset,
            FixedOffset::east_opt(7200).expect("offset")
        );
    }

    #[rstest]
    #[case(&[("FLEET_ROUTE_PROVIDER", "osrm")], "unknown route provider")]
    #[case(&[("FLEET_ROUTE_PROVIDER", "google")], "google_api_key")]
    #[case(&[("FLEET_BIND_ADDR", "localhost")], "invalid bind address")]
    fn invalid_settings_are_reported(
        #[case] overrides: &[(&'static str, &str)],
        #[case] expected: &str,
    ) {
        let _guard = lock_env(env_with(overrides));

        let settings = load();
        let message = settings
            .bind_addr()
            .err()
            .map(|err| err.to_string())
            .or_else(|| settings.route_provider().err().map(|err| err.to_string()))
            .expect("an error");
        assert!(message.contains(expected), "{message}");
    }
}
