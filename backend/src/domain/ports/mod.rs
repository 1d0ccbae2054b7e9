//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod factories_query;
mod factory_registration;
mod factory_repository;
mod login_service;

#[cfg(test)]
pub use factories_query::MockFactoriesQuery;
pub use factories_query::{FactoriesQuery, FactoryDetails};
#[cfg(test)]
pub use factory_registration::MockFactoryRegistration;
pub use factory_registration::FactoryRegistration;
#[cfg(test)]
pub use factory_repository::MockFactoryRepository;
pub use factory_repository::{FactoryInsertError, FactoryRepository, FactoryRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FIXTURE_ADMIN_ID, FixtureLoginService, LoginService};
