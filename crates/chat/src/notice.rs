//! User-visible texts.

use std::time::Duration;

use relay_providers::CompletionError;

/// How long transient notices stay visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(6);

pub const UNAUTHORIZED: &str = "You are not authorized to use this command.";
pub const BUSY: &str = "⏳ I'm still processing a previous message — please wait a moment.";
pub const EMPTY_INPUT: &str = "I didn't see any text to respond to.";
pub const TIMEOUT: &str = "⚠️ Sorry — the AI took too long to respond. Try again later.";

pub const BOUND: &str = "✅ This channel is now bound. I will respond to messages here.";
pub const UNBOUND: &str = "✅ Channel unbound. I will no longer listen to channel messages.";
pub const HISTORY_CLEARED: &str = "✅ Conversation history cleared for this channel.";
pub const SHUTTING_DOWN: &str = "Shutting down... (owner requested)";

/// Requests that are turned away before reaching the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A non-owner ran an owner-only command.
    Unauthorized,
    /// No channel is bound yet.
    NotBound,
    /// The channel already has a request in flight.
    Busy,
    /// The message had no text.
    EmptyInput,
}

impl Rejection {
    /// Text shown to the user, if the rejection is visible at all.
    pub fn notice(self) -> Option<&'static str> {
        match self {
            Self::Unauthorized => Some(UNAUTHORIZED),
            Self::NotBound => None,
            Self::Busy => Some(BUSY),
            Self::EmptyInput => Some(EMPTY_INPUT),
        }
    }
}

/// Reply text substituted for the assistant turn when a completion fails.
pub fn completion_notice(error: &CompletionError) -> String {
    match error {
        CompletionError::Timeout { .. } => TIMEOUT.to_owned(),
        CompletionError::Provider { message } => format!("⚠️ Error contacting AI: {message}"),
    }
}

pub fn model_set(model: &str) -> String {
    format!("✅ Model set to `{model}`.")
}

pub fn status(bound_channel: Option<&str>, model: &str) -> String {
    let bound = match bound_channel {
        Some(id) => format!("<#{id}>"),
        None => "Not bound".to_owned(),
    };
    format!("**Status**\nBound channel: {bound}\nModel: `{model}`")
}

pub fn pong(latency: Option<Duration>) -> String {
    match latency {
        Some(latency) => format!("Pong! latency: {} ms", latency.as_millis()),
        None => "Pong! latency: unknown".to_owned(),
    }
}

pub fn set_model_usage(prefix: &str) -> String {
    format!("Usage: `{prefix}setmodel <name>`")
}

pub fn save_failed(error: &relay_config::Error) -> String {
    format!("⚠️ Could not save settings: {error}")
}
