//! Shared error mapping for the persistence layer

use application::ApplicationError;

/// Map a redb error to an application-layer error
pub fn map_redb_error(e: redb::Error) -> ApplicationError {
    ApplicationError::Internal(format!("Storage error: {e}"))
}

/// Map a blocking task failure to an application-layer error
pub fn map_join_error(e: tokio::task::JoinError) -> ApplicationError {
    ApplicationError::Internal(format!("Task join error: {e}"))
}
