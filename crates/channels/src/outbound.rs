use std::time::Duration;

use {async_trait::async_trait, tokio_util::sync::CancellationToken};

use crate::{ChannelId, MessageId, Result};

/// Send messages to a chat platform.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Post `text` to a channel.
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> Result<()>;

    /// Post `text` and delete it again after `ttl`.
    async fn send_transient(&self, channel_id: ChannelId, text: &str, ttl: Duration)
    -> Result<()>;

    /// Reply to a specific message without pinging its author.
    async fn reply(&self, channel_id: ChannelId, message_id: MessageId, text: &str) -> Result<()>;

    /// Show the "typing" indicator until the returned guard is dropped.
    fn start_typing(&self, channel_id: ChannelId) -> TypingGuard;
}

/// Scoped "typing" indicator.
///
/// The indicator task watches the token; dropping the guard cancels it on
/// every exit path, including early returns and panics.
#[derive(Debug)]
pub struct TypingGuard {
    cancel: CancellationToken,
}

impl TypingGuard {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Guard with no indicator behind it.
    pub fn noop() -> Self {
        Self::new(CancellationToken::new())
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
