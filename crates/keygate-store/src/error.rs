//! error types for keygate-store.

use thiserror::Error;

/// errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// the requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// a record with the same identifier already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// the supplied resource version is stale.
    #[error("version conflict on {0}")]
    Conflict(String),

    /// the record is archived and rejects mutation.
    #[error("already archived: {0}")]
    AlreadyArchived(String),

    /// the payload failed domain validation.
    #[error(transparent)]
    Validation(#[from] keygate_access::Error),

    /// stored data could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// the database connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// a migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// an underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidData(e.to_string())
    }
}
