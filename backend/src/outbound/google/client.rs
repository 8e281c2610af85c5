//! Reqwest-backed Google Geocoding and Directions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{DirectionsResponseDto, GeocodeResponseDto};
use crate::domain::ports::{DirectionsProvider, Geocoder, RouteProviderError};
use crate::domain::{Coordinates, RouteLeg};
use crate::outbound::http_support::{
    HttpClientError, is_unavailable, parse_base_url, status_message, transport_message,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const REGION: &str = "ro";

/// Google Maps client implementing both [`Geocoder`] and
/// [`DirectionsProvider`].
pub struct GoogleMapsClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl GoogleMapsClient {
    /// Build a client against the public Google endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, HttpClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, timeout)
    }

    /// Build a client against an alternative base URL, e.g. a local stub.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or the reqwest client
    /// cannot be constructed.
    pub fn with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RouteProviderError> {
        self.base_url
            .join(path)
            .map_err(|err| RouteProviderError::rejected(format!("invalid endpoint {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, RouteProviderError> {
        let url = self.endpoint(path)?;
        debug!(endpoint = path, "calling Google Maps");
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| RouteProviderError::unavailable(transport_message(err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RouteProviderError::unavailable(transport_message(err)))?;
        if !status.is_success() {
            let message = status_message(status, &body);
            return Err(if is_unavailable(status) {
                RouteProviderError::unavailable(message)
            } else {
                RouteProviderError::rejected(message)
            });
        }
        decode_body(&body)
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, RouteProviderError> {
    serde_json::from_slice(body).map_err(|err| {
        RouteProviderError::decode(format!("invalid Google Maps JSON payload: {err}"))
    })
}

#[async_trait]
impl Geocoder for GoogleMapsClient {
    async fn geocode(&self, query: &str) -> Result<Coordinates, RouteProviderError> {
        let response: GeocodeResponseDto = self
            .get_json("geocode/json", &[("address", query), ("region", REGION)])
            .await?;
        response.into_coordinates()
    }
}

#[async_trait]
impl DirectionsProvider for GoogleMapsClient {
    async fn directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteLeg, RouteProviderError> {
        let from = origin.to_lat_lng_string();
        let to = destination.to_lat_lng_string();
        let response: DirectionsResponseDto = self
            .get_json(
                "directions/json",
                &[
                    ("origin", from.as_str()),
                    ("destination", to.as_str()),
                    ("mode", "driving"),
                    ("region", REGION),
                ],
            )
            .await?;
        response.into_leg()
    }
}
