//! Settings schema, JSON state persistence, and startup configuration.
//!
//! The state file holds the bound channel, the active model, and every
//! channel's rolling conversation log. It is loaded once at startup and
//! rewritten wholesale after each mutation.

pub mod bot;
pub mod error;
pub mod schema;
pub mod store;

pub use {
    bot::{
        BotConfig, DEFAULT_AI_TIMEOUT_SECS, DEFAULT_API_BASE, DEFAULT_COMMAND_PREFIX,
        DEFAULT_MODEL, DEFAULT_STATE_FILE,
    },
    error::{Error, Result},
    schema::{ConversationLog, Role, Settings, Turn},
    store::ConfigStore,
};
