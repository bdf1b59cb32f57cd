use thiserror::Error;

use crate::models::channel::{Channel, FailureKind};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification intent: {0}")]
    Validation(String),

    #[error("rate limit exceeded, retry after {retry_after_seconds}s")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("no active providers for channel {0}")]
    NoProvidersAvailable(Channel),

    #[error("provider {provider_id} failed: {message}")]
    Provider {
        provider_id: String,
        message: String,
    },

    #[error("recipient has no address for channel {0}")]
    NoAddressOnFile(Channel),

    #[error("store error: {0}")]
    Store(String),
}

impl NotifyError {
    /// Channel-level failure classification, recorded into the per-channel
    /// status map. Errors that abort a send before dispatch have no kind.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            NotifyError::NoProvidersAvailable(_) => Some(FailureKind::NoProvidersAvailable),
            NotifyError::NoAddressOnFile(_) => Some(FailureKind::NoAddressOnFile),
            NotifyError::Provider { .. } => Some(FailureKind::Provider),
            _ => None,
        }
    }
}
