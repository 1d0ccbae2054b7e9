//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn out_of_service() -> Error {
    Error::service_unavailable("No active screenshot factories.")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"title": "out of service", "hint": "Please try again later."}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn decode_response(error: Error, expected_trace_id: Option<&str>) -> (StatusCode, Error) {
    let response = ResponseError::error_response(&error);
    let status = response.status();

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is ASCII");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should be absent"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("error JSON deserialises");
    (status, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted() {
    let error = Error::internal("duplicate key value violates unique constraint")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"constraint": "factories_name_key"}));

    let (status, payload) = decode_response(error, Some(TRACE_ID)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn out_of_service_keeps_its_details(out_of_service: Error) {
    let (status, payload) = decode_response(out_of_service, Some(TRACE_ID)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(payload.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(payload.message(), "No active screenshot factories.");
    assert_eq!(
        payload.details(),
        Some(&json!({"title": "out of service", "hint": "Please try again later."}))
    );
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::not_found("no such factory");

    let (status, payload) = decode_response(error, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload.trace_id(), None);
    assert_eq!(payload.message(), "no such factory");
}

#[rstest]
#[case(Error::invalid_request("username must not be empty"))]
#[case(Error::service_unavailable("factory store unavailable"))]
fn public_view_leaves_non_internal_errors_alone(#[case] error: Error) {
    assert_eq!(public_view(&error), error);
}

#[rstest]
#[case(actix_web::error::ErrorBadRequest("Content type error"))]
#[case(actix_web::error::ErrorUnsupportedMediaType("Content type error"))]
fn extractor_rejections_become_invalid_requests(#[case] source: actix_web::Error) {
    let err: Error = source.into();

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Content type error");
}

#[rstest]
fn server_side_actix_errors_are_redacted() {
    let err: Error = actix_web::error::ErrorInternalServerError("pool poisoned").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
