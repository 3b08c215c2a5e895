//! Discord gateway adapter.
//!
//! Connects with serenity, translates gateway messages into router and
//! command calls, and implements outbound messaging over the Discord REST API.

pub mod bot;
pub mod error;
pub mod handler;
pub mod outbound;

pub use {
    bot::run,
    error::{Error, Result},
    handler::RelayHandler,
    outbound::DiscordOutbound,
};
