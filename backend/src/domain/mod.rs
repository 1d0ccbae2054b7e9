//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed screenshot-factory entities, the
//! registration form schema, and the services behind the driving ports.
//! Nothing here depends on HTTP or Diesel; adapters reach the domain through
//! [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - FactoryName, Factory, Browser, Screenshot: factory view model.
//! - FactoryRegistrationForm, FormErrors: registration schema.
//! - FactoryService: implementation of the factory driving ports.

pub mod auth;
pub mod browser;
pub mod error;
pub mod factory;
pub mod factory_service;
pub mod ports;
pub mod registration;
pub mod screenshot;
pub mod trace_id;
pub mod user;
pub mod view_policy;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::browser::{Browser, sort_browsers_for_display};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::factory::{
    Architecture, FACTORY_NAME_MAX, Factory, FactoryName, FactoryNameError, NewFactory,
    OperatingSystem, RESERVED_FACTORY_NAMES,
};
pub use self::factory_service::{
    FactoryService, NO_ACTIVE_FACTORIES_MESSAGE, STORE_UNAVAILABLE_MESSAGE,
};
pub use self::registration::{
    FactoryRegistrationForm, FormErrors, FormField, INVALID_CHOICE_MESSAGE, NAME_TAKEN_MESSAGE,
    REQUIRED_MESSAGE, RegistrationChoices, RegistrationOutcome, RejectedRegistration,
    SAVE_FAILED_MESSAGE, ValidRegistration,
};
pub use self::screenshot::{ColorDepth, ProblemReport, RecentScreenshot, ScreenSize, Screenshot};
pub use self::trace_id::TraceId;
pub use self::user::{UserId, UserValidationError};
pub use self::view_policy::{FactoryViewPolicy, RECENT_PROBLEMS_LIMIT, RECENT_SCREENSHOTS_LIMIT};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use shotserver::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such factory"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
