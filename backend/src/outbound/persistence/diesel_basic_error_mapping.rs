//! Diesel and pool error mapping for the document store.

use tracing::debug;

use crate::domain::ports::DocumentStoreError;

use super::pool::PoolError;

/// Pool failures are connection failures.
pub fn map_pool_error(error: PoolError) -> DocumentStoreError {
    debug!(%error, "document store pool checkout failed");
    DocumentStoreError::connection(error.message())
}

/// Map a Diesel error onto the port error, logging the driver detail.
pub fn map_diesel_error(error: diesel::result::Error) -> DocumentStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DocumentStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => DocumentStoreError::query("database query error"),
        DieselError::DeserializationError(err) | DieselError::SerializationError(err) => {
            DocumentStoreError::serialization(err.to_string())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DocumentStoreError::connection("database connection error")
        }
        DieselError::DatabaseError(_, info) => DocumentStoreError::query(info.message()),
        other => DocumentStoreError::query(other.to_string()),
    }
}
