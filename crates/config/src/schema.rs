//! Persisted state types (settings, conversation turns).
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
///
/// Unknown role strings are kept verbatim so a hand-edited state file
/// round-trips without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

/// Ordered turns of a single channel's conversation.
pub type ConversationLog = Vec<Turn>;

/// Process-wide bot state, persisted as one JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// String-encoded id of the only channel the bot answers in.
    pub bound_channel: Option<String>,

    /// Model identifier sent with every completion request.
    pub model: String,

    /// Conversation logs keyed by string-encoded channel id.
    pub conversations: BTreeMap<String, ConversationLog>,
}

impl Settings {
    /// Fresh state with nothing bound and no history.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            bound_channel: None,
            model: model.into(),
            conversations: BTreeMap::new(),
        }
    }

    /// Key under which a channel's log is stored.
    pub fn conversation_key(channel_id: u64) -> String {
        channel_id.to_string()
    }

    pub fn is_bound_to(&self, channel_id: u64) -> bool {
        self.bound_channel
            .as_deref()
            .is_some_and(|bound| bound.trim() == channel_id.to_string())
    }

    pub fn bind(&mut self, channel_id: u64) {
        self.bound_channel = Some(channel_id.to_string());
    }

    pub fn unbind(&mut self) {
        self.bound_channel = None;
    }

    pub fn conversation(&self, channel_id: u64) -> Option<&ConversationLog> {
        self.conversations.get(&Self::conversation_key(channel_id))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrips_unknown_values() {
        let turn: Turn = serde_json::from_str(r#"{"role":"tool","content":"x"}"#).unwrap();
        assert_eq!(turn.role, Role::Other("tool".into()));
        let json = serde_json::to_string(&turn).unwrap();
        assert_eq!(json, r#"{"role":"tool","content":"x"}"#);
    }

    #[test]
    fn known_roles_serialize_lowercase() {
        let log = vec![Turn::system("s"), Turn::user("u"), Turn::assistant("a")];
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[2]["role"], "assistant");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"bound_channel":"42"}"#).unwrap();
        assert_eq!(settings.bound_channel.as_deref(), Some("42"));
        assert!(settings.model.is_empty());
        assert!(settings.conversations.is_empty());
    }

    #[test]
    fn binding_compares_string_encoded_ids() {
        let mut settings = Settings::with_model("m");
        assert!(!settings.is_bound_to(7));
        settings.bind(7);
        assert_eq!(settings.bound_channel.as_deref(), Some("7"));
        assert!(settings.is_bound_to(7));
        assert!(!settings.is_bound_to(8));
        settings.unbind();
        assert!(!settings.is_bound_to(7));
    }
}
