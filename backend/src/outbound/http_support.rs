//! Helpers shared by the reqwest-based adapters.

use reqwest::{StatusCode, Url};

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Failures while constructing an outbound HTTP adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Parse a base URL, adding the trailing slash `Url::join` needs to keep
/// the last path segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}

/// Whitespace-collapsed, length-capped preview of an error body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// `status 503: upstream down` style message for a failed response.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

/// Transport failures, with the URL stripped so API keys in query strings
/// never reach logs or error payloads.
pub(crate) fn transport_message(error: reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "connection failed"
    } else if error.is_decode() {
        "response could not be read"
    } else {
        "request failed"
    };
    format!("{kind}: {}", error.without_url())
}

/// Whether an HTTP status means the upstream service is (temporarily)
/// unable to answer rather than refusing the request.
pub(crate) fn is_unavailable(status: StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT
        )
}
