//! Shared request validation helpers for the HTTP adapter.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending field, echo the rejected value where one exists and carry a
//! stable machine-readable code.

use std::fmt::Display;
use std::str::FromStr;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Coordinates, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidDate,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidDate => "invalid_date",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidValue => "invalid_value",
        }
    }
}

/// Wire name of a request field, as clients spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({ "field": field.as_str(), "value": value, "code": code.as_str() }),
        None => json!({ "field": field.as_str(), "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        format!("missing required field: {}", field.as_str()),
        ErrorCode::MissingField,
        None,
    )
}

/// Report a value that failed a domain rule, reusing the rule's message.
pub(crate) fn invalid_value_error(field: FieldName, value: &str, reason: impl Display) -> Error {
    field_error(
        field,
        format!("{}: {reason}", field.as_str()),
        ErrorCode::InvalidValue,
        Some(value),
    )
}

/// Report a domain rule that spans several fields.
pub(crate) fn invalid_field_error(field: FieldName, reason: impl Display) -> Error {
    field_error(field, reason.to_string(), ErrorCode::InvalidValue, None)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            Some(value),
        )
    })
}

/// Parse a UUID into one of the typed identifiers.
pub(crate) fn parse_id<T: From<Uuid>>(value: &str, field: FieldName) -> Result<T, Error> {
    parse_uuid(value, field).map(T::from)
}

pub(crate) fn parse_optional_id<T: From<Uuid>>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_id(raw, field)).transpose()
}

pub(crate) fn parse_id_list<T: From<Uuid>>(
    values: &[String],
    field: FieldName,
) -> Result<Vec<T>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value.trim()).map(T::from).map_err(|_| {
                Error::invalid_request(format!("{} must contain valid UUIDs", field.as_str()))
                    .with_details(json!({
                        "field": field.as_str(),
                        "index": index,
                        "value": value,
                        "code": ErrorCode::InvalidUuid.as_str(),
                    }))
            })
        })
        .collect()
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`).
pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        field_error(
            field,
            format!("{} must be a date in YYYY-MM-DD form", field.as_str()),
            ErrorCode::InvalidDate,
            Some(value),
        )
    })
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

pub(crate) fn parse_rfc3339_timestamp(value: &str, field: FieldName) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_error(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                ErrorCode::InvalidTimestamp,
                Some(value),
            )
        })
}

/// Parse a wire enum or validated newtype through its `FromStr` impl.
pub(crate) fn parse_field<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse::<T>()
        .map_err(|err| invalid_value_error(field, value, err))
}

pub(crate) fn parse_optional_field<T>(value: Option<&str>, field: FieldName) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|raw| parse_field(raw, field)).transpose()
}

/// Build coordinates from an optional latitude/longitude pair; both halves
/// must be present together.
pub(crate) fn parse_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinates>, Error> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng)
            .map(Some)
            .map_err(|err| invalid_field_error(FieldName::new("latitude"), err)),
        (Some(_), None) => Err(missing_field_error(FieldName::new("longitude"))),
        (None, Some(_)) => Err(missing_field_error(FieldName::new("latitude"))),
    }
}

/// Distinguish an absent patch field (`None`) from an explicit `null`
/// (`Some(None)`). Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": "invalid_body" }))
        .into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": "invalid_query" }))
        .into()
}

/// JSON extractor settings reporting malformed bodies as domain errors.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Query extractor settings reporting malformed query strings as domain
/// errors.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}
