//! Error types for the job-board data layer.

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result type alias for data-layer operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error types for data-layer operations.
///
/// Every variant maps to an HTTP status via [`ApiError::status_code`], so a
/// route layer can translate errors without inspecting them further.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or unusable caller input (e.g. an empty partial update)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures on a request body
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// No caller identity was supplied for a gated operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Create a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a decode error for a specific column.
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a bad-request or validation error.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_) | Self::Validation(_))
    }

    /// The HTTP status code a route layer should answer with.
    ///
    /// Constraint violations are 400-class: they are triggered by
    /// caller-supplied data (duplicate handles, unknown company references),
    /// not by faults inside this crate.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_)
            | Self::Validation(_)
            | Self::UniqueViolation(_)
            | Self::ForeignKeyViolation(_)
            | Self::CheckViolation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Decode { .. } | Self::Connection(_) | Self::Query(_) | Self::Config(_) => 500,
            #[cfg(feature = "pool")]
            Self::Pool(_) => 500,
        }
    }

    /// Parse a tokio_postgres error into a more specific ApiError.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ApiError::bad_request("no data").status_code(), 400);
        assert_eq!(ApiError::unauthorized("login required").status_code(), 401);
        assert_eq!(ApiError::forbidden("admin only").status_code(), 403);
        assert_eq!(ApiError::not_found("no such company").status_code(), 404);
        assert_eq!(ApiError::Connection("refused".into()).status_code(), 500);
    }

    #[test]
    fn constraint_violations_are_client_errors() {
        assert_eq!(ApiError::UniqueViolation("companies_pkey".into()).status_code(), 400);
        assert_eq!(
            ApiError::ForeignKeyViolation("jobs_company_handle_fkey".into()).status_code(),
            400
        );
    }

    #[test]
    fn predicates() {
        assert!(ApiError::not_found("x").is_not_found());
        assert!(!ApiError::bad_request("x").is_not_found());
        assert!(ApiError::bad_request("x").is_bad_request());
    }
}
