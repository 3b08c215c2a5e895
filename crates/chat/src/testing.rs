//! Recording fakes shared by the router and command tests.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    async_trait::async_trait,
    relay_channels::{ChannelId, ChannelOutbound, MessageId, TypingGuard},
    relay_config::{ConfigStore, Settings, Turn},
    relay_providers::CompletionProvider,
    relay_sessions::ConversationManager,
    tempfile::TempDir,
    tokio::sync::Notify,
    tokio_util::sync::CancellationToken,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        channel_id: ChannelId,
        text: String,
    },
    Transient {
        channel_id: ChannelId,
        text: String,
        ttl: Duration,
    },
    Reply {
        channel_id: ChannelId,
        message_id: MessageId,
        text: String,
    },
}

#[derive(Default)]
pub struct RecordingOutbound {
    pub sent: Mutex<Vec<Sent>>,
    pub typing: Mutex<Vec<CancellationToken>>,
}

impl RecordingOutbound {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn replies(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Reply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Whether every typing indicator started so far has been stopped.
    pub fn all_typing_stopped(&self) -> bool {
        self.typing
            .lock()
            .unwrap()
            .iter()
            .all(CancellationToken::is_cancelled)
    }

    pub fn typing_started(&self) -> usize {
        self.typing.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, channel_id: ChannelId, text: &str) -> relay_channels::Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            channel_id,
            text: text.to_owned(),
        });
        Ok(())
    }

    async fn send_transient(
        &self,
        channel_id: ChannelId,
        text: &str,
        ttl: Duration,
    ) -> relay_channels::Result<()> {
        self.sent.lock().unwrap().push(Sent::Transient {
            channel_id,
            text: text.to_owned(),
            ttl,
        });
        Ok(())
    }

    async fn reply(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        text: &str,
    ) -> relay_channels::Result<()> {
        self.sent.lock().unwrap().push(Sent::Reply {
            channel_id,
            message_id,
            text: text.to_owned(),
        });
        Ok(())
    }

    fn start_typing(&self, _channel_id: ChannelId) -> TypingGuard {
        let token = CancellationToken::new();
        self.typing.lock().unwrap().push(token.clone());
        TypingGuard::new(token)
    }
}

pub enum Behavior {
    Reply(String),
    Fail(&'static str),
    Hang,
    /// Signal `entered`, then wait for `release` before answering.
    Gated {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        reply: &'static str,
    },
}

pub struct ScriptedProvider {
    behavior: Behavior,
    pub calls: Mutex<Vec<(String, Vec<Turn>)>>,
}

impl ScriptedProvider {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: impl Into<String>) -> Arc<Self> {
        Self::new(Behavior::Reply(text.into()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, model: &str, messages: &[Turn]) -> anyhow::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_owned(), messages.to_vec()));
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => anyhow::bail!("{message}"),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".into())
            },
            Behavior::Gated {
                entered,
                release,
                reply,
            } => {
                entered.notify_one();
                release.notified().await;
                Ok((*reply).to_owned())
            },
        }
    }
}

/// A conversation manager over a fresh state file in a temp dir.
pub fn conversations(settings: Settings) -> (TempDir, Arc<ConversationManager>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ConfigStore::with_settings(
        dir.path().join("state.json"),
        settings,
    ));
    (dir, Arc::new(ConversationManager::new(store)))
}
