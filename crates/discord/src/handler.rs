//! Discord event handler for serenity.
//!
//! Every message event is either a command for the dispatcher or chat for
//! the router; nothing else is handled.

use std::{sync::Arc, time::Duration};

use {
    relay_chat::{CommandDispatcher, CommandInvocation, InboundMessage, MessageRouter, RouteOutcome},
    serenity::{
        all::{Context, EventHandler, GatewayIntents, Message, Ready, ShardManager},
        async_trait,
        prelude::TypeMapKey,
    },
    tracing::{debug, info},
};

use crate::outbound::DiscordOutbound;

/// Client data slot holding the shard manager, for latency and shutdown.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// Handler for Discord gateway events.
pub struct RelayHandler {
    router: Arc<MessageRouter>,
    commands: Arc<CommandDispatcher>,
}

impl RelayHandler {
    pub fn new(router: Arc<MessageRouter>, commands: Arc<CommandDispatcher>) -> Self {
        Self { router, commands }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

fn inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        message_id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        author_is_bot: msg.author.bot,
        is_direct: msg.guild_id.is_none(),
        content: msg.content.clone(),
    }
}

/// Last measured heartbeat round-trip of the shard serving `ctx`.
async fn shard_latency(ctx: &Context) -> Option<Duration> {
    let manager = {
        let data = ctx.data.read().await;
        Arc::clone(data.get::<ShardManagerContainer>()?)
    };
    let runners = manager.runners.lock().await;
    runners.get(&ctx.shard_id)?.latency
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            bot_id = ready.user.id.get(),
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Skip bot messages to prevent loops
        if msg.author.bot {
            return;
        }

        let outbound = DiscordOutbound::new(Arc::clone(&ctx.http));

        if let Some(command) = self.commands.parse(&msg.content) {
            let invocation = CommandInvocation {
                command,
                caller_id: msg.author.id.get(),
                channel_id: msg.channel_id.get(),
                message_id: msg.id.get(),
                latency: shard_latency(&ctx).await,
            };
            let outcome = self.commands.dispatch(&outbound, &invocation).await;
            debug!(
                command = invocation.command.name(),
                ?outcome,
                "command handled"
            );
            return;
        }

        let outcome = self.router.handle(&outbound, &inbound(&msg)).await;
        if let RouteOutcome::Replied { chunks, error } = &outcome {
            debug!(
                channel_id = msg.channel_id.get(),
                chunks,
                failed = error.is_some(),
                "reply delivered"
            );
        }
    }
}
