//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Connections come from a `bb8` pool through `diesel-async`. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module; repositories hand domain values to the rest of the crate and
//! report failures as the port error types.
//!
//! # Example
//!
//! ```no_run
//! use shotserver::outbound::persistence::{
//!     DbPool, DieselFactoryRepository, PoolConfig, migrate,
//! };
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://shots@localhost/shotserver";
//! migrate(url.to_owned()).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let repo = DieselFactoryRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_factory_repository;
pub(crate) mod diesel_helpers;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_factory_repository::DieselFactoryRepository;
pub use migrations::{MIGRATIONS, MigrationError, migrate, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
