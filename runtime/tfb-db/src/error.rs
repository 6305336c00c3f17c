use rusqlite::ErrorCode;
use thiserror::Error;

/// A point-select, full-scan or row decode against the store failed.
///
/// This is the only failure the query operations surface. The message is the
/// store's own error text; the statement name is kept for logging.
#[derive(Debug, Error)]
#[error("{cause}")]
pub struct QueryFailure {
    statement: &'static str,
    #[source]
    cause: rusqlite::Error,
}

impl QueryFailure {
    pub fn new(statement: &'static str, cause: rusqlite::Error) -> Self {
        Self { statement, cause }
    }

    /// Name of the statement that was executing.
    pub fn statement(&self) -> &'static str {
        self.statement
    }

    pub(crate) fn cause(&self) -> &rusqlite::Error {
        &self.cause
    }

    /// The connection itself is unusable (I/O error, corrupt or replaced
    /// file) rather than the statement or its result.
    pub fn is_connection_fault(&self) -> bool {
        matches!(
            self.cause().sqlite_error_code(),
            Some(
                ErrorCode::SystemIoFailure
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::NotADatabase
                    | ErrorCode::CannotOpen
            )
        )
    }
}
