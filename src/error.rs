//! Error model for the existence verifier.
//! Argument and identifier failures are raised before any store I/O; store failures
//! are carried through untouched so callers see the store's own error chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("{code}: {message}")]
    InvalidArgument { code: String, message: String },
    #[error("{code}: {message}")]
    SecurityViolation { code: String, message: String },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl VerifyError {
    pub fn invalid<S: Into<String>>(code: S, msg: S) -> Self { VerifyError::InvalidArgument { code: code.into(), message: msg.into() } }
    pub fn security<S: Into<String>>(code: S, msg: S) -> Self { VerifyError::SecurityViolation { code: code.into(), message: msg.into() } }

    /// Stable category code, suitable for metrics labels and log fields.
    pub fn code_str(&self) -> &str {
        match self {
            VerifyError::InvalidArgument { .. } => "invalid_argument",
            VerifyError::SecurityViolation { .. } => "security_violation",
            VerifyError::Store(_) => "store_failure",
        }
    }

    /// Detail code given at the raise site (e.g. `missing_value`, `unsafe_identifier`).
    pub fn detail_code(&self) -> Option<&str> {
        match self {
            VerifyError::InvalidArgument { code, .. }
            | VerifyError::SecurityViolation { code, .. } => Some(code.as_str()),
            VerifyError::Store(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            VerifyError::InvalidArgument { message, .. }
            | VerifyError::SecurityViolation { message, .. } => message.clone(),
            VerifyError::Store(e) => e.to_string(),
        }
    }

    pub fn is_security_violation(&self) -> bool { matches!(self, VerifyError::SecurityViolation { .. }) }
    pub fn is_invalid_argument(&self) -> bool { matches!(self, VerifyError::InvalidArgument { .. }) }
    pub fn is_store_failure(&self) -> bool { matches!(self, VerifyError::Store(_)) }
}

pub type VerifyResult<T> = Result<T, VerifyError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
