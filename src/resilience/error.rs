// src/resilience/error.rs
//
// The only two storage-failure shapes that leave the executor.
// Anything else the executor sees is folded into one of these.

use chrono::{DateTime, Local};
use thiserror::Error;

/// Boxed underlying failure carried as context
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Human-readable timestamp used in resilience messages
pub(crate) const MESSAGE_TIMESTAMP: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Error)]
pub enum ResilienceError {
    /// The breaker rejected the call, or a failure inside this call tripped it.
    #[error("{message}")]
    CircuitOpen {
        message: String,
        /// When the breaker last opened
        opened_at: DateTime<Local>,
        /// Message of the failure that opened the breaker
        cause: String,
        /// The failure observed by this call, when this call tripped the breaker
        #[source]
        source: Option<BoxError>,
    },

    /// Every attempt failed while the breaker stayed closed.
    #[error("{message}")]
    RetryExhausted {
        message: String,
        attempts: u32,
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the operation before it completed.
    #[error("Database operation cancelled at {0}")]
    Cancelled(String),
}

impl ResilienceError {
    pub(crate) fn circuit_open(
        opened_at: DateTime<Local>,
        cause: String,
        source: Option<BoxError>,
    ) -> Self {
        ResilienceError::CircuitOpen {
            message: format!(
                "The circuit breaker is open since {} ({}); checked at {}",
                opened_at.format(MESSAGE_TIMESTAMP),
                cause,
                Local::now().format(MESSAGE_TIMESTAMP)
            ),
            opened_at,
            cause,
            source,
        }
    }

    pub(crate) fn retry_exhausted(attempts: u32, source: BoxError) -> Self {
        ResilienceError::RetryExhausted {
            message: format!(
                "Database operation failed after {} attempt(s) at {}: {}",
                attempts,
                Local::now().format(MESSAGE_TIMESTAMP),
                source
            ),
            attempts,
            source,
        }
    }

    pub(crate) fn cancelled() -> Self {
        ResilienceError::Cancelled(Local::now().format(MESSAGE_TIMESTAMP).to_string())
    }

    /// Circuit-open and retry-exhausted both mean "storage is unavailable right now"
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ResilienceError::CircuitOpen { .. } | ResilienceError::RetryExhausted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_retry_exhausted_keeps_source() {
        let source: BoxError = "disk I/O error".into();
        let err = ResilienceError::retry_exhausted(4, source);

        assert!(err.to_string().contains("after 4 attempt(s)"));
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk I/O error"));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_circuit_open_message_has_timestamp_and_cause() {
        let opened_at = Local::now();
        let err = ResilienceError::circuit_open(opened_at, "database is locked".into(), None);

        let text = err.to_string();
        assert!(text.contains(&opened_at.format(MESSAGE_TIMESTAMP).to_string()));
        assert!(text.contains("database is locked"));
        assert!(err.source().is_none());
    }
}
