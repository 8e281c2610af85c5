//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn conflict_error() -> Error {
    Error::conflict("team lead has an active assignment")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("busy"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn convenience_constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "  \t ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn try_with_trace_id_rejects_blank_values(conflict_error: Error) {
    let result = conflict_error.try_with_trace_id(" ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn trace_id_is_absent_outside_request_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_inside_request_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid trace id");
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields(conflict_error: Error) {
    let value = serde_json::to_value(conflict_error).expect("serialise error");
    assert_eq!(
        value,
        json!({ "code": "conflict", "message": "team lead has an active assignment" })
    );
}

#[rstest]
fn round_trips_details_and_trace_id() {
    let error = Error::invalid_request("bad hours")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "field": "hours", "code": "out_of_range" }));
    let encoded = serde_json::to_string(&error).expect("serialise error");
    assert!(encoded.contains("\"traceId\""));
    let decoded: Error = serde_json::from_str(&encoded).expect("deserialise error");
    assert_eq!(decoded, error);
}

#[rstest]
fn deserialisation_rejects_blank_message() {
    let result = serde_json::from_value::<Error>(json!({
        "code": "not_found",
        "message": "   "
    }));
    assert!(result.is_err());
}
