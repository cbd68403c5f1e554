//! Error types for the profit automation core.

use sea_orm::DbErr;
use thiserror::Error;

/// Failures reported by the trend and fulfillment collaborators.
///
/// Every variant is recoverable: callers skip the item or fall back to the
/// synthetic order generator.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential configured. Expected in demo deployments.
    #[error("{provider}: no credentials configured")]
    MissingCredentials { provider: &'static str },

    #[error("{provider}: request timed out")]
    Timeout { provider: &'static str },

    #[error("{provider}: request failed: {source}")]
    Http {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: API error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider}: could not decode response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn from_reqwest(provider: &'static str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProviderError::Timeout { provider }
        } else {
            ProviderError::Http { provider, source }
        }
    }

    /// Missing credentials is a configuration state, not a fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, ProviderError::MissingCredentials { .. })
    }
}

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    /// A computed money split did not reconcile. The record is rejected.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("stage '{stage}' timed out after {secs}s")]
    StageTimeout { stage: &'static str, secs: u64 },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type AutomationResult<T> = Result<T, AutomationError>;
