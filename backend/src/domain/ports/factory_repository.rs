//! Driven port for factory persistence.
//!
//! Reads return fully resolved domain values: lookup labels for
//! architectures, operating systems and browser components are joined or
//! batch-loaded by the adapter. Inserts report a name collision as a typed
//! [`FactoryInsertError::UniqueViolation`] so callers never inspect backend
//! error text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Browser, ColorDepth, Factory, NewFactory, ProblemReport, RegistrationChoices, ScreenSize,
    Screenshot,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading factories and related rows.
    pub enum FactoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "factory repository connection failed: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "factory repository query failed: {message}",
    }
}

define_port_error! {
    /// Errors raised when inserting a factory.
    pub enum FactoryInsertError {
        /// Another factory already uses the name.
        UniqueViolation { name: String } => "factory name already exists: {name}",
        /// Repository connection could not be established.
        Connection { message: String } => "factory insert connection failed: {message}",
        /// Insert failed for any other reason; the write was rolled back.
        Query { message: String } => "factory insert failed: {message}",
    }
}

/// Port for factory storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FactoryRepository: Send + Sync {
    /// Factories whose last poll is strictly after `polled_after`.
    ///
    /// Ordered by `uploads_per_day` descending, then name ascending.
    async fn list_active(
        &self,
        polled_after: DateTime<Utc>,
    ) -> Result<Vec<Factory>, FactoryRepositoryError>;

    /// Exact-name lookup.
    async fn find_by_name(&self, name: &str) -> Result<Option<Factory>, FactoryRepositoryError>;

    /// All browsers installed on the factory, in no particular order.
    async fn browsers_for_factory(
        &self,
        factory_id: i32,
    ) -> Result<Vec<Browser>, FactoryRepositoryError>;

    /// Newest screenshots (by id) whose website score is at most
    /// `max_profanities`.
    async fn recent_screenshots(
        &self,
        factory_id: i32,
        max_profanities: i32,
        limit: i64,
    ) -> Result<Vec<Screenshot>, FactoryRepositoryError>;

    /// Newest problem reports (by id) against the factory's screenshots.
    async fn recent_problem_reports(
        &self,
        factory_id: i32,
        limit: i64,
    ) -> Result<Vec<ProblemReport>, FactoryRepositoryError>;

    /// Supported resolutions, ascending.
    async fn screen_sizes(&self, factory_id: i32)
    -> Result<Vec<ScreenSize>, FactoryRepositoryError>;

    /// Supported colour depths, ascending.
    async fn color_depths(&self, factory_id: i32)
    -> Result<Vec<ColorDepth>, FactoryRepositoryError>;

    /// Architectures and operating systems offered at registration.
    async fn registration_choices(&self) -> Result<RegistrationChoices, FactoryRepositoryError>;

    /// Insert a factory atomically and return the stored row.
    ///
    /// Name uniqueness is enforced by the store; no pre-check is made.
    async fn insert(&self, factory: &NewFactory) -> Result<Factory, FactoryInsertError>;
}
