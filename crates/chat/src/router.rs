use std::{sync::Arc, time::Duration};

use {
    relay_channels::{ChannelGate, ChannelId, ChannelOutbound, MAX_MESSAGE_LEN, chunk_message},
    relay_config::Turn,
    relay_providers::{CompletionError, CompletionInvoker, DEFAULT_TIMEOUT},
    relay_sessions::ConversationManager,
    tracing::{debug, warn},
};

use crate::{
    inbound::InboundMessage,
    notice::{self, NOTICE_TTL, Rejection},
};

/// Why a message was dropped without any response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    BotAuthor,
    DirectMessage,
    OtherChannel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Ignored(IgnoreReason),
    Rejected(Rejection),
    /// A reply was produced and `chunks` pieces of it were delivered.
    /// `error` is set when the reply is a failure notice.
    Replied {
        chunks: usize,
        error: Option<CompletionError>,
    },
}

/// Routes chat messages from the bound channel to the completion provider
/// and posts the answer back.
pub struct MessageRouter {
    conversations: Arc<ConversationManager>,
    gate: Arc<dyn ChannelGate>,
    invoker: CompletionInvoker,
    ai_timeout: Duration,
    notice_ttl: Duration,
}

impl MessageRouter {
    pub fn new(
        conversations: Arc<ConversationManager>,
        gate: Arc<dyn ChannelGate>,
        invoker: CompletionInvoker,
    ) -> Self {
        Self {
            conversations,
            gate,
            invoker,
            ai_timeout: DEFAULT_TIMEOUT,
            notice_ttl: NOTICE_TTL,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, ai_timeout: Duration) -> Self {
        self.ai_timeout = ai_timeout;
        self
    }

    /// Handle one inbound message.
    ///
    /// The channel gate is held from the busy check until the assistant
    /// turn is recorded; a message that finds it held is dropped with a
    /// transient notice rather than queued. The typing indicator runs for
    /// the same span.
    pub async fn handle(&self, outbound: &dyn ChannelOutbound, msg: &InboundMessage) -> RouteOutcome {
        if msg.author_is_bot {
            debug!(author_id = msg.author_id, "ignoring bot message");
            return RouteOutcome::Ignored(IgnoreReason::BotAuthor);
        }
        if msg.is_direct {
            debug!(author_id = msg.author_id, "ignoring direct message");
            return RouteOutcome::Ignored(IgnoreReason::DirectMessage);
        }

        let channel_id = msg.channel_id;
        let store = self.conversations.store();
        let (has_binding, bound_here) =
            store.read(|s| (s.bound_channel.is_some(), s.is_bound_to(channel_id)));
        if !has_binding {
            debug!(channel_id, "no channel bound, ignoring message");
            return RouteOutcome::Rejected(Rejection::NotBound);
        }
        if !bound_here {
            debug!(channel_id, "message outside bound channel");
            return RouteOutcome::Ignored(IgnoreReason::OtherChannel);
        }

        let Some(permit) = self.gate.try_enter(channel_id) else {
            debug!(channel_id, message_id = msg.message_id, "channel busy, dropping message");
            self.notify(outbound, channel_id, Rejection::Busy).await;
            return RouteOutcome::Rejected(Rejection::Busy);
        };
        let typing = outbound.start_typing(channel_id);

        let text = msg.content.trim();
        if text.is_empty() {
            debug!(channel_id, message_id = msg.message_id, "empty message, nothing to send");
            drop(typing);
            drop(permit);
            self.notify(outbound, channel_id, Rejection::EmptyInput).await;
            return RouteOutcome::Rejected(Rejection::EmptyInput);
        }

        let model = store.read(|s| s.model.clone());
        let log = self
            .conversations
            .append_and_trim(channel_id, Turn::user(text));

        let (reply, error) = match self
            .invoker
            .complete(channel_id, &log, &model, self.ai_timeout)
            .await
        {
            Ok(reply) => (reply, None),
            Err(e) => (notice::completion_notice(&e), Some(e)),
        };
        self.conversations
            .append_and_trim(channel_id, Turn::assistant(reply.clone()));

        drop(typing);
        drop(permit);

        let chunks = chunk_message(&reply, MAX_MESSAGE_LEN);
        let mut delivered = 0;
        for chunk in &chunks {
            if let Err(e) = outbound.send_text(channel_id, chunk).await {
                warn!(
                    channel_id,
                    error = %e,
                    delivered,
                    total = chunks.len(),
                    "failed to deliver reply chunk"
                );
                break;
            }
            delivered += 1;
        }

        RouteOutcome::Replied {
            chunks: delivered,
            error,
        }
    }

    async fn notify(
        &self,
        outbound: &dyn ChannelOutbound,
        channel_id: ChannelId,
        rejection: Rejection,
    ) {
        let Some(text) = rejection.notice() else {
            return;
        };
        if let Err(e) = outbound
            .send_transient(channel_id, text, self.notice_ttl)
            .await
        {
            warn!(channel_id, ?rejection, error = %e, "failed to send notice");
        }
    }
}
