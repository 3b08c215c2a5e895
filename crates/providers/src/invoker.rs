use std::{sync::Arc, time::Duration};

use {
    relay_config::ConversationLog,
    tracing::{debug, warn},
};

use crate::{CompletionProvider, error::CompletionError};

/// Default deadline for one completion request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Wraps a single provider call with a hard deadline and error
/// normalization. Never retries.
#[derive(Clone)]
pub struct CompletionInvoker {
    provider: Arc<dyn CompletionProvider>,
}

impl CompletionInvoker {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send `log` to the provider with `model`, giving up after `timeout`.
    pub async fn complete(
        &self,
        channel_id: u64,
        log: &ConversationLog,
        model: &str,
        timeout: Duration,
    ) -> Result<String, CompletionError> {
        debug!(
            channel_id,
            model,
            provider = self.provider.name(),
            turns = log.len(),
            "completion request"
        );
        let started = std::time::Instant::now();

        match tokio::time::timeout(timeout, self.provider.complete(model, log)).await {
            Ok(Ok(text)) => {
                debug!(
                    channel_id,
                    model,
                    elapsed_ms = started.elapsed().as_millis(),
                    chars = text.chars().count(),
                    "completion response"
                );
                Ok(text)
            },
            Ok(Err(e)) => {
                warn!(channel_id, model, error = %e, "completion request failed");
                Err(CompletionError::provider(format!("{e:#}")))
            },
            Err(_) => {
                warn!(
                    channel_id,
                    model,
                    timeout_secs = timeout.as_secs(),
                    "completion request timed out"
                );
                Err(CompletionError::Timeout { after: timeout })
            },
        }
    }
}
