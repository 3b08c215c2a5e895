//! Administrative commands.
//!
//! Commands are addressed with a prefix (`!` by default) and work in any
//! channel or direct message. Everything except `status` and `ping` is
//! reserved for the owner; other callers get a refusal and nothing changes.

use std::{sync::Arc, time::Duration};

use {
    relay_channels::{ChannelId, ChannelOutbound, MessageId, UserId},
    relay_config::DEFAULT_COMMAND_PREFIX,
    relay_sessions::ConversationManager,
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

use crate::notice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetupChannel,
    UnsetChannel,
    /// `None` when the model name is missing.
    SetModel(Option<String>),
    ClearHistory,
    Status,
    Shutdown,
    Ping,
}

impl Command {
    /// Parse `content` as a command. Returns `None` for anything that is not
    /// a known command name directly after `prefix`.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let rest = content.trim_start().strip_prefix(prefix)?;
        if rest.starts_with(char::is_whitespace) {
            return None;
        }
        let mut words = rest.split_whitespace();
        let command = match words.next()? {
            "setupchannel" => Self::SetupChannel,
            "unsetchannel" => Self::UnsetChannel,
            "setmodel" => Self::SetModel(words.next().map(str::to_owned)),
            "clearhistory" => Self::ClearHistory,
            "status" => Self::Status,
            "shutdown" => Self::Shutdown,
            "ping" => Self::Ping,
            _ => return None,
        };
        Some(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetupChannel => "setupchannel",
            Self::UnsetChannel => "unsetchannel",
            Self::SetModel(_) => "setmodel",
            Self::ClearHistory => "clearhistory",
            Self::Status => "status",
            Self::Shutdown => "shutdown",
            Self::Ping => "ping",
        }
    }

    pub fn requires_owner(&self) -> bool {
        !matches!(self, Self::Status | Self::Ping)
    }
}

/// One command as received from the platform.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub command: Command,
    pub caller_id: UserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    /// Most recent gateway heartbeat round-trip, if one has been measured.
    pub latency: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Replied,
    Refused,
    /// The owner asked the bot to stop; the shutdown token is cancelled.
    ShutdownRequested,
}

pub struct CommandDispatcher {
    owner_id: UserId,
    conversations: Arc<ConversationManager>,
    shutdown: CancellationToken,
    prefix: String,
}

impl CommandDispatcher {
    pub fn new(
        owner_id: UserId,
        conversations: Arc<ConversationManager>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            owner_id,
            conversations,
            shutdown,
            prefix: DEFAULT_COMMAND_PREFIX.to_owned(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn parse(&self, content: &str) -> Option<Command> {
        Command::parse(&self.prefix, content)
    }

    pub async fn dispatch(
        &self,
        outbound: &dyn ChannelOutbound,
        invocation: &CommandInvocation,
    ) -> CommandOutcome {
        let command = &invocation.command;
        if command.requires_owner() && invocation.caller_id != self.owner_id {
            warn!(
                command = command.name(),
                caller_id = invocation.caller_id,
                "refusing owner-only command"
            );
            self.reply(outbound, invocation, notice::UNAUTHORIZED).await;
            return CommandOutcome::Refused;
        }

        let store = self.conversations.store();
        let channel_id = invocation.channel_id;
        let text = match command {
            Command::SetupChannel => match store.update(|s| s.bind(channel_id)) {
                Ok(()) => {
                    info!(channel_id, "channel bound");
                    notice::BOUND.to_owned()
                },
                Err(e) => notice::save_failed(&e),
            },
            Command::UnsetChannel => match store.update(|s| s.unbind()) {
                Ok(()) => {
                    info!("channel unbound");
                    notice::UNBOUND.to_owned()
                },
                Err(e) => notice::save_failed(&e),
            },
            Command::SetModel(None) => notice::set_model_usage(&self.prefix),
            Command::SetModel(Some(model)) => {
                match store.update(|s| s.model = model.clone()) {
                    Ok(()) => {
                        info!(model = %model, "model changed");
                        notice::model_set(model)
                    },
                    Err(e) => notice::save_failed(&e),
                }
            },
            Command::ClearHistory => match self.conversations.clear(channel_id) {
                Ok(_) => {
                    info!(channel_id, "conversation history cleared");
                    notice::HISTORY_CLEARED.to_owned()
                },
                Err(e) => notice::save_failed(&e),
            },
            Command::Status => {
                store.read(|s| notice::status(s.bound_channel.as_deref(), &s.model))
            },
            Command::Ping => notice::pong(invocation.latency),
            Command::Shutdown => {
                info!(caller_id = invocation.caller_id, "shutdown requested by owner");
                self.reply(outbound, invocation, notice::SHUTTING_DOWN).await;
                self.shutdown.cancel();
                return CommandOutcome::ShutdownRequested;
            },
        };

        self.reply(outbound, invocation, &text).await;
        CommandOutcome::Replied
    }

    async fn reply(&self, outbound: &dyn ChannelOutbound, invocation: &CommandInvocation, text: &str) {
        if let Err(e) = outbound
            .reply(invocation.channel_id, invocation.message_id, text)
            .await
        {
            warn!(
                command = invocation.command.name(),
                channel_id = invocation.channel_id,
                error = %e,
                "failed to send command reply"
            );
        }
    }
}
