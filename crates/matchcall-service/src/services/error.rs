//! Service layer error types
//!
//! Provides a unified error type for all lifecycle operations.

use matchcall_common::AppError;
use matchcall_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation (bad transition, wrong state for the action)
    Domain(DomainError),

    /// Application error (configuration, etc.)
    App(AppError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Validation error
    Validation(String),

    /// Conflict with the current lifecycle state
    Conflict(String),

    /// Internal error (runtime unavailable, etc.)
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the stable error code
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The wrapped domain error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) | Self::App(AppError::Domain(e)) => Some(e),
            _ => None,
        }
    }

    /// True when the call was rejected by the match transition table
    pub fn is_transition(&self) -> bool {
        self.as_domain().is_some_and(DomainError::is_transition)
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use matchcall_core::{MatchStatus, MatchTransition, Snowflake};

    #[test]
    fn test_not_found_error() {
        let err = ServiceError::not_found("Match", "123");
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(err.to_string().contains("Match not found: 123"));
    }

    #[test]
    fn test_domain_error_code_passthrough() {
        let err: ServiceError = DomainError::InvalidTransition {
            from: MatchStatus::Expired,
            event: MatchTransition::CallStarted,
        }
        .into();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert!(err.is_transition());
    }

    #[test]
    fn test_validation_error() {
        let err = ServiceError::validation("countdown must be positive");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_transition());
    }

    #[test]
    fn test_convert_to_app_error() {
        let service_err = ServiceError::from(DomainError::MatchNotFound(Snowflake::new(9)));
        let app_err: AppError = service_err.into();
        assert_eq!(app_err.error_code(), "UNKNOWN_MATCH");
        assert!(app_err.is_client_error());

        let app_err: AppError = ServiceError::internal("runtime gone").into();
        assert!(!app_err.is_client_error());
    }
}
