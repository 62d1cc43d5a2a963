//! Error types for dayline.

use thiserror::Error;

/// Errors that can occur in dayline operations.
#[derive(Error, Debug)]
pub enum DaylineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session expired: {0}")]
    AuthExpired(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for dayline operations.
pub type DaylineResult<T> = Result<T, DaylineError>;

/// Failure reported by a calendar source provider.
///
/// `AuthExpired` means every further call with the same session will fail too;
/// `Transient` only concerns the single call that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("session expired: {0}")]
    AuthExpired(String),

    #[error("{0}")]
    Transient(String),
}

impl ProviderError {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ProviderError::AuthExpired(_))
    }
}

impl From<DaylineError> for ProviderError {
    fn from(err: DaylineError) -> Self {
        match err {
            DaylineError::AuthExpired(msg) => ProviderError::AuthExpired(msg),
            other => ProviderError::Transient(other.to_string()),
        }
    }
}

impl From<ProviderError> for DaylineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthExpired(msg) => DaylineError::AuthExpired(msg),
            ProviderError::Transient(msg) => DaylineError::Provider(msg),
        }
    }
}

/// Why a raw event could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("event has no start time")]
    MissingStart,

    #[error("event has no end time")]
    MissingEnd,

    #[error("invalid {field} time '{value}'")]
    InvalidTime { field: &'static str, value: String },
}
