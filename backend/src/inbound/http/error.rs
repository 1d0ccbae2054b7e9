//! HTTP mapping for domain errors.
//!
//! Factory pages report "out of service" and "store unavailable" as 503 with
//! their details intact; only internal errors lose their message on the way
//! out. Extractor rejections (a form that cannot be decoded, say) arrive as
//! `actix_web::Error` and are folded back into the domain envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The error as clients see it: internal messages and details are dropped,
/// the trace id is kept so the log line can be found.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(INTERNAL_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(public_view(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        let status = err.as_response_error().status_code();
        if status.is_client_error() {
            debug!(error = %err, %status, "request rejected by extractor");
            return Error::invalid_request(err.to_string());
        }
        error!(error = %err, %status, "actix error promoted to domain error");
        Error::internal(INTERNAL_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
