//! Platform-neutral request handling: the inbound message router and the
//! owner-gated administrative commands.

pub mod commands;
pub mod inbound;
pub mod notice;
pub mod router;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod testing;

pub use {
    commands::{Command, CommandDispatcher, CommandInvocation, CommandOutcome},
    inbound::InboundMessage,
    notice::Rejection,
    router::{IgnoreReason, MessageRouter, RouteOutcome},
};
