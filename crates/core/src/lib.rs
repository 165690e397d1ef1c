//! Shared primitives for all Rust crates in Admiral.

#![forbid(unsafe_code)]

/// Verified identity claims handed over by the upstream gateway.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::VerifiedClaims;

/// Result type used across Admiral crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No verified identity reached the service.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Requester is identified but the access policy denied the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Backing directory refused the call because of rate limiting.
    ///
    /// Never retried internally; callers decide when to try again.
    #[error("throttled: {0}")]
    Throttled(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_keeps_original_value() {
        let value = NonEmptyString::new(" TA_ops ");
        assert_eq!(
            value.map(String::from).unwrap_or_default(),
            " TA_ops ".to_owned()
        );
    }

    #[test]
    fn throttled_error_mentions_category() {
        let error = AppError::Throttled("directory rate limit".to_owned());
        assert_eq!(error.to_string(), "throttled: directory rate limit");
    }
}
