use std::{path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, Secret};

use crate::{Error, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_STATE_FILE: &str = "relay_bot_config.json";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Startup configuration resolved from the environment and CLI flags.
#[derive(Clone)]
pub struct BotConfig {
    /// Discord bot token.
    pub discord_token: Secret<String>,

    /// The only user allowed to run administrative commands.
    pub owner_id: u64,

    /// Model used when the state file does not name one.
    pub default_model: String,

    /// Base URL of the OpenAI-compatible completion API.
    pub api_base: String,

    /// Bearer token for the completion API, if it requires one.
    pub api_key: Option<Secret<String>>,

    /// Where the JSON state file lives.
    pub state_file: PathBuf,

    /// Hard deadline for a single completion request.
    pub ai_timeout: Duration,

    pub command_prefix: String,
}

impl BotConfig {
    pub fn new(discord_token: impl Into<String>, owner_id: u64) -> Self {
        Self {
            discord_token: Secret::new(discord_token.into()),
            owner_id,
            default_model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            api_key: None,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            ai_timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            command_prefix: DEFAULT_COMMAND_PREFIX.into(),
        }
    }

    /// Reject configurations the bot cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.discord_token.expose_secret().trim().is_empty() {
            return Err(Error::missing("DISCORD_TOKEN"));
        }
        if self.owner_id == 0 {
            return Err(Error::missing("OWNER_ID"));
        }
        if self.default_model.trim().is_empty() {
            return Err(Error::invalid("default model must not be empty"));
        }
        if self.ai_timeout.is_zero() {
            return Err(Error::invalid("AI timeout must be greater than zero"));
        }
        if self.command_prefix.is_empty() {
            return Err(Error::invalid("command prefix must not be empty"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .field("default_model", &self.default_model)
            .field("api_base", &self.api_base)
            .field("state_file", &self.state_file)
            .field("ai_timeout", &self.ai_timeout)
            .finish_non_exhaustive()
    }
}
