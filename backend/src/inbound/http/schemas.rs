//! OpenAPI schemas for domain types.
//!
//! Domain types do not derive `ToSchema`; these mirrors are registered under
//! the domain names instead.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    /// A dependency is down, or no factory is active.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    #[schema(example = "No active screenshot factories.")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "6f1f3bd4-5c55-4f52-9a43-2f1e8d1f0c11")]
    trace_id: Option<String>,
    details: Option<serde_json::Value>,
}
