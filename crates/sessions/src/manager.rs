use std::sync::Arc;

use {
    relay_config::{ConfigStore, ConversationLog, Settings, Turn},
    tracing::{debug, warn},
};

use crate::trim::{CONTEXT_LIMIT, trim_history};

/// Seeded as the first turn of every new conversation.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful, concise assistant in a Discord channel. Answer politely.";

/// Owns the rolling history of every channel and persists it through the
/// shared [`ConfigStore`].
pub struct ConversationManager {
    store: Arc<ConfigStore>,
    context_limit: usize,
    system_prompt: String,
}

impl ConversationManager {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self {
            store,
            context_limit: CONTEXT_LIMIT,
            system_prompt: SYSTEM_PROMPT.to_owned(),
        }
    }

    #[must_use]
    pub fn with_context_limit(mut self, context_limit: usize) -> Self {
        self.context_limit = context_limit;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Append `turn` to the channel's log, trim it, store it, and flush the
    /// settings to disk. Returns the trimmed log.
    ///
    /// A channel with no (or an empty) log starts from the system prompt.
    /// Persistence failures are logged; the in-memory log is still updated.
    pub fn append_and_trim(&self, channel_id: u64, turn: Turn) -> ConversationLog {
        let key = Settings::conversation_key(channel_id);
        let mut trimmed = ConversationLog::new();

        let result = self.store.update(|settings| {
            let mut log = settings.conversations.remove(&key).unwrap_or_default();
            if log.is_empty() {
                log.push(Turn::system(self.system_prompt.clone()));
            }
            log.push(turn);
            let log = trim_history(log, self.context_limit);
            trimmed = log.clone();
            settings.conversations.insert(key.clone(), log);
        });

        if let Err(e) = result {
            warn!(channel_id, error = %e, "failed to persist conversation");
        }
        debug!(channel_id, turns = trimmed.len(), "conversation updated");
        trimmed
    }

    /// Current log of a channel (empty when it has no history yet).
    pub fn history(&self, channel_id: u64) -> ConversationLog {
        self.store
            .read(|settings| settings.conversation(channel_id).cloned())
            .unwrap_or_default()
    }

    /// Drop the channel's whole log. Returns whether one existed.
    pub fn clear(&self, channel_id: u64) -> relay_config::Result<bool> {
        let key = Settings::conversation_key(channel_id);
        self.store
            .update(|settings| settings.conversations.remove(&key).is_some())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, relay_config::store::load_settings};

    fn manager() -> (tempfile::TempDir, ConversationManager) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("state.json"), "m").unwrap();
        (dir, ConversationManager::new(Arc::new(store)))
    }

    #[test]
    fn first_user_turn_seeds_system_prompt() {
        let (_dir, manager) = manager();
        let log = manager.append_and_trim(5, Turn::user("hello"));
        assert_eq!(log, vec![Turn::system(SYSTEM_PROMPT), Turn::user("hello")]);

        let log = manager.append_and_trim(5, Turn::assistant("hi"));
        assert_eq!(log, vec![
            Turn::system(SYSTEM_PROMPT),
            Turn::user("hello"),
            Turn::assistant("hi"),
        ]);
    }

    #[test]
    fn appends_are_persisted() {
        let (dir, manager) = manager();
        manager.append_and_trim(5, Turn::user("hello"));

        let on_disk = load_settings(&dir.path().join("state.json"), "m").unwrap();
        assert_eq!(on_disk.conversations["5"].len(), 2);
        assert_eq!(on_disk.conversations["5"][1], Turn::user("hello"));
    }

    #[test]
    fn channels_are_isolated() {
        let (_dir, manager) = manager();
        manager.append_and_trim(1, Turn::user("one"));
        manager.append_and_trim(2, Turn::user("two"));
        assert_eq!(manager.history(1)[1].content, "one");
        assert_eq!(manager.history(2)[1].content, "two");
    }

    #[test]
    fn twenty_five_exchanges_keep_recent_window() {
        let (_dir, manager) = manager();
        let mut log = ConversationLog::new();
        for i in 0..25 {
            manager.append_and_trim(9, Turn::user(format!("q{i}")));
            log = manager.append_and_trim(9, Turn::assistant(format!("a{i}")));
        }
        assert_eq!(log.len(), 1 + 2 * CONTEXT_LIMIT);
        assert_eq!(log[0], Turn::system(SYSTEM_PROMPT));
        assert_eq!(log[1], Turn::user("q13"));
        assert_eq!(log.last(), Some(&Turn::assistant("a24")));
        assert_eq!(manager.history(9), log);
    }

    #[test]
    fn clear_removes_log_and_next_turn_reseeds() {
        let (_dir, manager) = manager();
        manager.append_and_trim(3, Turn::user("x"));
        assert!(manager.clear(3).unwrap());
        assert!(!manager.clear(3).unwrap());
        assert!(manager.history(3).is_empty());

        let log = manager.append_and_trim(3, Turn::user("y"));
        assert_eq!(log, vec![Turn::system(SYSTEM_PROMPT), Turn::user("y")]);
    }

    #[test]
    fn custom_limit_and_prompt() {
        let (_dir, manager) = manager();
        let manager = manager.with_context_limit(1).with_system_prompt("short");
        manager.append_and_trim(1, Turn::user("a"));
        manager.append_and_trim(1, Turn::assistant("b"));
        let log = manager.append_and_trim(1, Turn::user("c"));
        assert_eq!(log, vec![
            Turn::system("short"),
            Turn::assistant("b"),
            Turn::user("c"),
        ]);
    }
}
