//! Rolling per-channel conversation history.
//!
//! Logs live inside the persisted settings document, keyed by channel id,
//! and are trimmed to a bounded window after every append.

pub mod manager;
pub mod trim;

pub use {
    manager::{ConversationManager, SYSTEM_PROMPT},
    trim::{CONTEXT_LIMIT, trim_history},
};
