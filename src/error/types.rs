// src/error/types.rs
use crate::domain::DomainError;
use crate::resilience::ResilienceError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Resilience(#[from] ResilienceError),

    /// A staged update or delete matched no row when flushed
    #[error("Concurrency conflict: {0}")]
    Conflict(String),

    /// The key is already tracked with different values; detach it first
    #[error("Tracking conflict: {0}")]
    TrackingConflict(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    /// Storage unavailable right now (circuit open or retries exhausted)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Resilience(e) if e.is_unavailable())
    }

    /// Failures of the storage call itself, worth retrying and counted by the breaker.
    ///
    /// Constraint violations, conflicts and decoding errors are answers from a
    /// healthy store and are not.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Database(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code != rusqlite::ErrorCode::ConstraintViolation
            }
            AppError::Database(_) => false,
            AppError::Pool(_) | AppError::Io(_) => true,
            _ => false,
        }
    }

    /// A unique, foreign-key or check constraint rejected the write
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            AppError::Database(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;

    #[test]
    fn test_domain_error_converts() {
        let err: AppError = DomainError::not_found(EntityKind::Book, 7).into();
        assert!(matches!(err, AppError::Domain(DomainError::NotFound { .. })));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_transient_classification() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(AppError::Database(busy).is_transient());

        let unique = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed".to_string()),
        );
        let unique = AppError::Database(unique);
        assert!(!unique.is_transient());
        assert!(unique.is_constraint_violation());

        assert!(AppError::Pool("timed out".to_string()).is_transient());
        assert!(!AppError::Conflict("gone".to_string()).is_transient());
    }

    #[test]
    fn test_serializes_as_message() {
        let err = AppError::InvalidQuery("page number must be at least 1".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Invalid query: page number must be at least 1\"");
    }
}
