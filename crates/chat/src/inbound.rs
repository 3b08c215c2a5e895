use relay_channels::{ChannelId, MessageId, UserId};

/// An inbound chat message, stripped of platform specifics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    /// Set for messages from any bot account, including this one.
    pub author_is_bot: bool,
    /// Set for direct messages (no guild).
    pub is_direct: bool,
    pub content: String,
}
