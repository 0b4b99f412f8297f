// src/application/error_handling.rs
//
// Error Handling at the controller boundary
//
// ARCHITECTURE:
// - Maps internal errors → status code + caller-facing body
// - Internal details are only exposed outside production
// - Server-side failures are logged here, once

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::domain::DomainError;
use crate::error::AppError;
use crate::resilience::ResilienceError;

/// Standard error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub error_type: ErrorType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Resource not found (404)
    NotFound,

    /// Invalid input/validation error (400)
    Validation,

    /// Duplicate key or concurrent modification (409)
    Conflict,

    /// Storage temporarily unavailable (503)
    Unavailable,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorType {
    pub fn status(self) -> u16 {
        match self {
            ErrorType::NotFound => 404,
            ErrorType::Validation => 400,
            ErrorType::Conflict => 409,
            ErrorType::Unavailable => 503,
            ErrorType::Internal => 500,
        }
    }
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status: error_type.status(),
            error_type,
            message: message.into(),
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError, environment: Environment) -> Self {
        let expose = !environment.is_production();

        match error {
            AppError::Domain(domain @ DomainError::NotFound { .. }) => {
                Self::new(ErrorType::NotFound, domain.to_string(), None)
            }

            AppError::Domain(domain @ DomainError::AlreadyExists { .. }) => {
                Self::new(ErrorType::Conflict, domain.to_string(), None)
            }

            AppError::Domain(DomainError::Validation(messages)) => Self::new(
                ErrorType::Validation,
                "Validation failed",
                Some(messages.join("; ")),
            ),

            AppError::InvalidQuery(message) => {
                Self::new(ErrorType::Validation, "Invalid query", Some(message))
            }

            AppError::Conflict(message) | AppError::TrackingConflict(message) => {
                warn!("event=write_conflict detail={}", message);
                Self::new(
                    ErrorType::Conflict,
                    "The record was changed or removed by another operation",
                    expose.then_some(message),
                )
            }

            ref constraint if constraint.is_constraint_violation() => {
                warn!("event=constraint_violation detail={}", constraint);
                Self::new(
                    ErrorType::Conflict,
                    "The write violates a storage constraint",
                    expose.then(|| constraint.to_string()),
                )
            }

            AppError::Resilience(ref resilience) if resilience.is_unavailable() => {
                error!("event=storage_unavailable detail={}", resilience);
                let message = match resilience {
                    ResilienceError::CircuitOpen { .. } => "Storage is temporarily unavailable",
                    _ => "Storage did not respond after several attempts",
                };
                Self::new(
                    ErrorType::Unavailable,
                    message,
                    expose.then(|| resilience.to_string()),
                )
            }

            other => {
                error!("event=internal_error detail={:?}", other);
                Self::new(
                    ErrorType::Internal,
                    "Internal error",
                    expose.then(|| other.to_string()),
                )
            }
        }
    }

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}
