//! In-process adapters used when no database is configured and by tests.

mod factory_repository;

pub use factory_repository::InMemoryFactoryRepository;
