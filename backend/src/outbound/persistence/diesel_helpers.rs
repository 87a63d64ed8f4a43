//! Shared helpers for Diesel repository implementations.
//!
//! Each repository owns a small `map_diesel_error` that turns a
//! [`DieselFailure`] into its port error; the classification and debug
//! logging live here so they stay identical across adapters.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Coarse classification of a Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(&'static str),
    /// The statement failed for any other reason.
    Query(&'static str),
    /// A unique constraint rejected the write.
    UniqueViolation {
        /// Constraint or index name reported by PostgreSQL.
        constraint: Option<String>,
    },
    /// A foreign key rejected the write.
    ForeignKeyViolation {
        /// Constraint name reported by PostgreSQL.
        constraint: Option<String>,
    },
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ClosedConnection => {
                DieselFailure::Connection("database connection error")
            }
            _ => DieselFailure::Query("database error"),
        },
        _ => DieselFailure::Query("database error"),
    }
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(crate) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}

/// Convert a `u32` count or limit into a SQL `BIGINT`.
pub(crate) fn to_sql_limit(value: impl Into<u64>) -> i64 {
    i64::try_from(value.into()).unwrap_or(i64::MAX)
}

/// Convert a SQL `COUNT(*)` into an unsigned count.
pub(crate) fn from_sql_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
