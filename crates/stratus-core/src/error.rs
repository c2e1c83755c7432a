//! Unified error types for all layers of Stratus.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Transport-level failure talking to the remote key-value store.
///
/// On cache reads these degrade to recomputing through the loader, and the
/// post-load write is logged and dropped; explicit writes after a source
/// mutation surface them instead. A dedicated enum lets callers inside the
/// cache layer decide fallback policy per variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (connection refused, pool exhausted).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer within the configured deadline.
    #[error("Store call timed out: {0}")]
    Timeout(String),

    /// The store answered with something we could not interpret.
    #[error("Store protocol error: {0}")]
    Protocol(String),
}

impl StoreError {
    /// Whether a read failing with this error should be treated as a miss.
    ///
    /// `Unavailable` and `Timeout` are transient; a `Protocol` error on a
    /// read is also degraded to a miss since the cached value is still
    /// recomputable, but it is logged at a higher severity by callers.
    #[must_use]
    pub const fn degrades_to_miss(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// A single field-level constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field name.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable violation code.
    pub code: String,
}

impl FieldViolation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Unified error type for all layers of Stratus.
///
/// `Clone` is required: a single settled load outcome fans out to every
/// subscriber of an in-flight load, and each receives the same error.
#[derive(Error, Debug, Clone)]
pub enum StratusError {
    /// Resource not found.
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// One or more field violations in user input. Never retried.
    #[error("Validation failed: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// Remote store failure. Transient; degrade-to-compute on reads.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Wire payload could not be encoded or decoded. Fatal for the request.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The business computation behind a cache miss failed.
    /// Propagated verbatim to every subscriber of that load.
    #[error("Loader error: {0}")]
    Loader(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl StratusError {
    /// Returns the HTTP status code a boundary layer would map this error to.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Store(_) => 503,
            Self::Serialization(_)
            | Self::Loader(_)
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(StoreError::Unavailable(_)) => "STORE_UNAVAILABLE",
            Self::Store(StoreError::Timeout(_)) => "STORE_TIMEOUT",
            Self::Store(StoreError::Protocol(_)) => "STORE_PROTOCOL_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Loader(_) => "LOADER_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error from a set of violations.
    #[must_use]
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation(violations)
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization<T: Into<String>>(message: T) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a loader error.
    #[must_use]
    pub fn loader<T: Into<String>>(message: T) -> Self {
        Self::Loader(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is transient and worth retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<serde_json::Error> for StratusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(StratusError::not_found("User", 1).status_code(), 404);
        assert_eq!(StratusError::validation(vec![]).status_code(), 400);
        assert_eq!(
            StratusError::from(StoreError::Timeout("get".into())).status_code(),
            503
        );
        assert_eq!(StratusError::serialization("bad json").status_code(), 500);
        assert_eq!(StratusError::loader("db down").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(StratusError::not_found("User", 1).error_code(), "NOT_FOUND");
        assert_eq!(
            StratusError::from(StoreError::Unavailable("refused".into())).error_code(),
            "STORE_UNAVAILABLE"
        );
        assert_eq!(
            StratusError::from(StoreError::Protocol("wat".into())).error_code(),
            "STORE_PROTOCOL_ERROR"
        );
        assert_eq!(
            StratusError::validation(vec![]).error_code(),
            "VALIDATION_ERROR"
        );
    }

    #[test]
    fn test_retriable_errors() {
        assert!(StratusError::from(StoreError::Timeout("t".into())).is_retriable());
        assert!(!StratusError::not_found("User", 1).is_retriable());
        assert!(!StratusError::validation(vec![]).is_retriable());
        assert!(!StratusError::loader("boom").is_retriable());
    }

    #[test]
    fn test_degrades_to_miss() {
        assert!(StoreError::Unavailable("refused".into()).degrades_to_miss());
        assert!(StoreError::Timeout("slow".into()).degrades_to_miss());
        assert!(!StoreError::Protocol("garbage".into()).degrades_to_miss());
    }

    #[test]
    fn test_validation_display_lists_all_violations() {
        let err = StratusError::validation(vec![
            FieldViolation::new("name", "must not be blank", "not_blank"),
            FieldViolation::new("email", "invalid email address", "email"),
        ]);
        let text = err.to_string();
        assert!(text.contains("name: must not be blank"));
        assert!(text.contains("email: invalid email address"));
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = StratusError::loader("shared across subscribers");
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }
}
