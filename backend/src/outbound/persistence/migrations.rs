//! Embedded Diesel migrations applied at startup.
//!
//! `diesel_migrations` drives a synchronous `PgConnection`, so the async
//! entry point runs the harness on the blocking pool.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connection { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    #[error("migration task failed: {message}")]
    Task { message: String },
}

/// Apply pending migrations and return how many ran.
pub fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| {
        MigrationError::Connection {
            message: err.to_string(),
        }
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    for version in &applied {
        info!(%version, "applied migration");
    }
    Ok(applied.len())
}

/// Async wrapper around [`run_pending_migrations`].
pub async fn migrate(database_url: String) -> Result<usize, MigrationError> {
    tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|err| MigrationError::Task {
            message: err.to_string(),
        })?
}
