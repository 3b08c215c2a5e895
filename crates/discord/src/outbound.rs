use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    relay_channels::{ChannelId, ChannelOutbound, Error, MessageId, Result, TypingGuard},
    serenity::all::{
        ChannelId as DiscordChannelId, CreateAllowedMentions, CreateMessage, Http,
        MessageId as DiscordMessageId,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, trace},
};

/// Discord refreshes the typing indicator for about ten seconds per call.
const TYPING_REFRESH: Duration = Duration::from_secs(8);

/// Outbound message sender backed by the Discord REST client.
#[derive(Clone)]
pub struct DiscordOutbound {
    http: Arc<Http>,
}

impl DiscordOutbound {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChannelOutbound for DiscordOutbound {
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> Result<()> {
        DiscordChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map_err(|e| Error::external("discord send message", e))?;
        Ok(())
    }

    async fn send_transient(&self, channel_id: ChannelId, text: &str, ttl: Duration) -> Result<()> {
        let channel = DiscordChannelId::new(channel_id);
        let sent = channel
            .say(&self.http, text)
            .await
            .map_err(|e| Error::external("discord send notice", e))?;

        let http = Arc::clone(&self.http);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Err(e) = channel.delete_message(&http, sent.id).await {
                debug!(channel_id, error = %e, "failed to delete transient notice");
            }
        });
        Ok(())
    }

    async fn reply(&self, channel_id: ChannelId, message_id: MessageId, text: &str) -> Result<()> {
        let channel = DiscordChannelId::new(channel_id);
        let builder = CreateMessage::new()
            .content(text)
            .reference_message((channel, DiscordMessageId::new(message_id)))
            .allowed_mentions(CreateAllowedMentions::new().replied_user(false));
        channel
            .send_message(&self.http, builder)
            .await
            .map_err(|e| Error::external("discord send reply", e))?;
        Ok(())
    }

    fn start_typing(&self, channel_id: ChannelId) -> TypingGuard {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let http = Arc::clone(&self.http);
        let channel = DiscordChannelId::new(channel_id);
        tokio::spawn(async move {
            loop {
                if let Err(e) = channel.broadcast_typing(&http).await {
                    trace!(channel_id, error = %e, "typing indicator failed");
                }
                tokio::select! {
                    _ = tokio::time::sleep(TYPING_REFRESH) => {},
                    _ = token.cancelled() => break,
                }
            }
        });
        TypingGuard::new(cancel)
    }
}
