//! Reqwest-backed Mapbox Geocoding and Directions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{DirectionsResponseDto, ErrorBodyDto, GeocodeResponseDto};
use crate::domain::ports::{DirectionsProvider, Geocoder, RouteProviderError};
use crate::domain::{Coordinates, RouteLeg};
use crate::outbound::http_support::{
    HttpClientError, is_unavailable, parse_base_url, status_message, transport_message,
};

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/";
const COUNTRY: &str = "ro";

/// Mapbox client implementing both [`Geocoder`] and [`DirectionsProvider`].
pub struct MapboxClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl MapboxClient {
    /// Build a client against the public Mapbox endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Result<Self, HttpClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, access_token, timeout)
    }

    /// Build a client against an alternative base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or the reqwest client
    /// cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            access_token: access_token.into(),
        })
    }

    fn geocode_url(&self, query: &str) -> Result<Url, RouteProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RouteProviderError::rejected("Mapbox base URL cannot hold a path"))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places"])
            .push(&format!("{query}.json"));
        Ok(url)
    }

    fn directions_url(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<Url, RouteProviderError> {
        let path = format!(
            "directions/v5/mapbox/driving/{},{};{},{}",
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        );
        self.base_url
            .join(&path)
            .map_err(|err| RouteProviderError::rejected(format!("invalid directions URL: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, &str)],
    ) -> Result<T, RouteProviderError> {
        debug!(path = url.path(), "calling Mapbox");
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|err| RouteProviderError::unavailable(transport_message(err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RouteProviderError::unavailable(transport_message(err)))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        decode_body(&body)
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, RouteProviderError> {
    serde_json::from_slice(body).map_err(|err| {
        RouteProviderError::decode(format!("invalid Mapbox JSON payload: {err}"))
    })
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RouteProviderError {
    if is_unavailable(status) {
        return RouteProviderError::unavailable(status_message(status, body));
    }
    // Directions reports an impossible route as 422 with code `NoRoute`.
    if let Ok(directions) = serde_json::from_slice::<DirectionsResponseDto>(body) {
        if let Err(err) = directions.into_leg() {
            return err;
        }
    }
    let message = serde_json::from_slice::<ErrorBodyDto>(body)
        .ok()
        .and_then(|dto| dto.message)
        .map_or_else(
            || status_message(status, body),
            |message| format!("status {}: {message}", status.as_u16()),
        );
    if status == StatusCode::NOT_FOUND {
        RouteProviderError::no_match(message)
    } else {
        RouteProviderError::rejected(message)
    }
}

#[async_trait]
impl Geocoder for MapboxClient {
    async fn geocode(&self, query: &str) -> Result<Coordinates, RouteProviderError> {
        let url = self.geocode_url(query)?;
        let response: GeocodeResponseDto = self
            .get_json(url, &[("limit", "1"), ("country", COUNTRY)])
            .await?;
        response.into_coordinates()
    }
}

#[async_trait]
impl DirectionsProvider for MapboxClient {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteLeg, RouteProviderError> {
        let url = self.directions_url(origin, destination)?;
        let response: DirectionsResponseDto = self
            .get_json(url, &[("overview", "false"), ("alternatives", "false")])
            .await?;
        response.into_leg()
    }
}
