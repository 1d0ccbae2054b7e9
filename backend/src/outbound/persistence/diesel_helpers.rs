//! Shared error mapping for the Diesel repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{FactoryInsertError, FactoryRepositoryError};

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

fn log_diesel_error(error: &DieselError, operation: &str) {
    match error {
        DieselError::DatabaseError(kind, info) => debug!(
            ?kind,
            message = info.message(),
            constraint = ?info.constraint_name(),
            %operation,
            "diesel operation failed"
        ),
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            %operation,
            "diesel operation failed"
        ),
    }
}

/// Map pool errors to read-side repository errors.
pub fn map_pool_error(error: PoolError) -> FactoryRepositoryError {
    FactoryRepositoryError::connection(map_pool_error_message(error))
}

/// Map Diesel errors to read-side repository errors.
pub fn map_diesel_error(error: DieselError) -> FactoryRepositoryError {
    log_diesel_error(&error, "read");
    match error {
        DieselError::NotFound => FactoryRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => FactoryRepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FactoryRepositoryError::connection("database connection error")
        }
        _ => FactoryRepositoryError::query("database error"),
    }
}

/// Map Diesel errors raised while inserting the factory called `name`.
///
/// A unique violation is reported by kind, never by message text. Other
/// database failures keep the backend message so the service can log it.
pub fn map_insert_error(error: DieselError, name: &str) -> FactoryInsertError {
    log_diesel_error(&error, "insert factory");
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            FactoryInsertError::unique_violation(name)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            FactoryInsertError::connection(info.message())
        }
        DieselError::DatabaseError(_, info) => FactoryInsertError::query(info.message()),
        other => FactoryInsertError::query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("factories")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some("factories_name_key")
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, message: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(message)))
    }

    #[rstest]
    fn unique_violation_is_typed() {
        let error = map_insert_error(
            database_error(DatabaseErrorKind::UniqueViolation, "duplicate key value"),
            "hardy",
        );
        assert_eq!(error, FactoryInsertError::unique_violation("hardy"));
    }

    #[rstest]
    #[case(DatabaseErrorKind::ClosedConnection, FactoryInsertError::connection("gone"))]
    #[case(DatabaseErrorKind::ForeignKeyViolation, FactoryInsertError::query("gone"))]
    #[case(DatabaseErrorKind::CheckViolation, FactoryInsertError::query("gone"))]
    fn other_insert_failures_keep_backend_text(
        #[case] kind: DatabaseErrorKind,
        #[case] expected: FactoryInsertError,
    ) {
        assert_eq!(map_insert_error(database_error(kind, "gone"), "hardy"), expected);
    }

    #[rstest]
    fn read_errors_split_connection_from_query() {
        assert_eq!(
            map_diesel_error(database_error(DatabaseErrorKind::ClosedConnection, "x")),
            FactoryRepositoryError::connection("database connection error")
        );
        assert_eq!(
            map_diesel_error(DieselError::NotFound),
            FactoryRepositoryError::query("record not found")
        );
        assert_eq!(
            map_pool_error(PoolError::checkout("timed out")),
            FactoryRepositoryError::connection("timed out")
        );
    }
}
