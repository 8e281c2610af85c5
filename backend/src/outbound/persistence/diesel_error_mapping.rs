//! Shared translation of Diesel and pool failures into port errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse classification of a Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Connection(String),
    Query(String),
    /// A foreign key still points at (or is missing) the row.
    ForeignKey(String),
    Unique(String),
}

fn constraint_label(info: &dyn diesel::result::DatabaseErrorInformation) -> String {
    info.constraint_name()
        .map_or_else(|| info.message().to_owned(), |name| format!("constraint {name}"))
}

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
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKey(constraint_label(&*info))
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::Unique(constraint_label(&*info))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error".to_owned()),
        _ => DieselFailure::Query("database error".to_owned()),
    }
}

/// Map a Diesel error for repositories that only distinguish connection
/// and query failures. Constraint violations count as query failures.
pub(crate) fn map_basic_diesel_error<E>(
    error: DieselError,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => connection(message),
        DieselFailure::Query(message)
        | DieselFailure::ForeignKey(message)
        | DieselFailure::Unique(message) => query(message),
    }
}

/// Map a pool failure with the repository's connection constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.into_message())
}

/// Convert rows, failing on the first row that does not satisfy the
/// domain invariants.
pub(crate) fn collect_rows<R, T, E>(
    rows: Vec<R>,
    convert: impl Fn(R) -> Result<T, String>,
    query: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    rows.into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()
        .map_err(query)
}
