use std::time::Duration;

use thiserror::Error;

/// Why a completion request produced no reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The provider did not answer before the deadline.
    #[error("completion timed out after {}s", after.as_secs())]
    Timeout { after: Duration },

    /// Transport or provider-side failure.
    #[error("{message}")]
    Provider { message: String },
}

impl CompletionError {
    #[must_use]
    pub fn provider(message: impl std::fmt::Display) -> Self {
        Self::Provider {
            message: message.to_string(),
        }
    }
}
