//! Screenshot factory web service.
//!
//! Lists screenshot factories that polled recently, shows a factory's
//! browsers and recent screenshots, and lets logged-in users register new
//! factories through a validated form.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
