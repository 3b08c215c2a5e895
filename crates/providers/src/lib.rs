//! Completion providers and the timeout-bounded invoker the router calls.

pub mod error;
pub mod invoker;
pub mod openai_compat;

use async_trait::async_trait;

use relay_config::Turn;

pub use {
    error::CompletionError,
    invoker::{CompletionInvoker, DEFAULT_TIMEOUT},
    openai_compat::OpenAiCompatProvider,
};

/// A remote chat-completion backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs (e.g. "openai").
    fn name(&self) -> &str;

    /// Send the whole conversation and return the assistant's reply text.
    ///
    /// One attempt only; retries and deadlines belong to the caller.
    async fn complete(&self, model: &str, messages: &[Turn]) -> anyhow::Result<String>;
}
