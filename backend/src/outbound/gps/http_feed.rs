//! Reqwest-backed GPS feed.
//!
//! `GET {base}/devices` lists trackers and
//! `GET {base}/positions?deviceId&from&to` returns fixes; both use a bearer
//! token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{DeviceDto, PositionDto, into_samples};
use crate::domain::ports::{GpsFeed, GpsFeedError};
use crate::domain::{GpsDevice, PositionSample};
use crate::outbound::http_support::{
    HttpClientError, is_unavailable, parse_base_url, status_message, transport_message,
};

/// HTTP implementation of [`GpsFeed`].
pub struct HttpGpsFeed {
    client: Client,
    base_url: Url,
    token: String,
}

impl HttpGpsFeed {
    /// # Errors
    ///
    /// Returns an error when the URL does not parse or the reqwest client
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            token: token.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, GpsFeedError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| GpsFeedError::rejected(format!("invalid GPS endpoint {path}: {err}")))?;
        debug!(endpoint = path, "calling GPS feed");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await
            .map_err(|err| GpsFeedError::unavailable(transport_message(err)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| GpsFeedError::unavailable(transport_message(err)))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        serde_json::from_slice(&body)
            .map_err(|err| GpsFeedError::decode(format!("invalid {path} payload: {err}")))
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GpsFeedError {
    let message = status_message(status, body);
    if is_unavailable(status) {
        GpsFeedError::unavailable(message)
    } else {
        GpsFeedError::rejected(message)
    }
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl GpsFeed for HttpGpsFeed {
    async fn list_devices(&self) -> Result<Vec<GpsDevice>, GpsFeedError> {
        let devices: Vec<DeviceDto> = self.get_json("devices", &[]).await?;
        Ok(devices.into_iter().map(DeviceDto::into_domain).collect())
    }

    async fn positions(
        &self,
        device_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PositionSample>, GpsFeedError> {
        let positions: Vec<PositionDto> = self
            .get_json(
                "positions",
                &[
                    ("deviceId", device_id.to_string()),
                    ("from", timestamp(from)),
                    ("to", timestamp(to)),
                ],
            )
            .await?;
        Ok(into_samples(positions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn timestamps_use_zulu_seconds() {
        let instant = Utc
            .with_ymd_and_hms(2025, 2, 3, 22, 0, 0)
            .single()
            .expect("timestamp");
        assert_eq!(timestamp(instant), "2025-02-03T22:00:00Z");
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    fn statuses_split_rejected_and_unavailable(#[case] status: StatusCode, #[case] unavailable: bool) {
        let err = map_status_error(status, b"");
        assert_eq!(matches!(err, GpsFeedError::Unavailable { .. }), unavailable);
    }
}
