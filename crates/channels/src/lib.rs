//! Chat-platform plumbing shared by the router and platform adapters.
//!
//! Holds the per-channel concurrency gate, the outbound messaging trait
//! platforms implement, and message chunking for platform size limits.

pub mod chunk;
pub mod error;
pub mod gate;
pub mod outbound;

pub use {
    chunk::{MAX_MESSAGE_LEN, chunk_message},
    error::{Error, Result},
    gate::{ChannelGate, GatePermit, LockRegistry},
    outbound::{ChannelOutbound, TypingGuard},
};

/// Platform channel identifier.
pub type ChannelId = u64;

/// Platform user identifier.
pub type UserId = u64;

/// Platform message identifier.
pub type MessageId = u64;
