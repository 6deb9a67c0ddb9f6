//! Unified error types for the persistence core.

use thiserror::Error;

use crate::filter::Operator;

/// Unified error type for the Biblio persistence layer.
///
/// Filter-construction and translation failures are raised before any
/// backend call; backend-reported failures are wrapped into this taxonomy
/// and surfaced to the caller unchanged. A lookup miss on a read operation
/// is **not** an error — it is an empty result.
#[derive(Error, Debug)]
pub enum BiblioError {
    /// Malformed filter: unknown field, or operator/value incompatibility.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The storage backend cannot express the requested operator.
    #[error("Backend '{backend}' does not support operator '{operator}'")]
    UnsupportedOperator {
        backend: &'static str,
        operator: Operator,
    },

    /// The target of an update or delete does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Constraint violation, e.g. a duplicate identifier.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The storage backend cannot be reached.
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    /// Entity-level validation failure.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BiblioError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFilter(_) => "INVALID_FILTER",
            Self::UnsupportedOperator { .. } => "UNSUPPORTED_OPERATOR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Unavailable(_) => "BACKEND_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates an invalid-filter error.
    #[must_use]
    pub fn invalid_filter<T: Into<String>>(message: T) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// Creates a not-found error for an entity.
    #[must_use]
    pub fn not_found<T: ToString>(entity: &'static str, id: T) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a persistence error.
    #[must_use]
    pub fn persistence<T: Into<String>>(message: T) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a backend-unavailable error.
    #[must_use]
    pub fn unavailable<T: Into<String>>(message: T) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
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

    /// Checks if this error reflects a transient backend condition.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for BiblioError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                // Unique-constraint violations: MySQL 1062, PostgreSQL 23505.
                if let Some(code) = db_err.code() {
                    if code == "1062" || code == "23505" {
                        return Self::Persistence(db_err.message().to_string());
                    }
                }
                Self::Internal(err.to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::Unavailable(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
