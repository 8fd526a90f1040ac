//! Port over the chat platform's guild, plus its backends.

/// Discord-flavored REST backend.
pub mod discord;
mod error;
/// In-memory guild backend used by tests and dry runs.
pub mod memory;
/// Guild data views shared by every backend.
pub mod models;

use futures::future::BoxFuture;

pub use self::error::{ChatError, ChatResult};
pub use self::models::{
    CategoryInfo, ChannelId, GuildSnapshot, MessageId, TextChannelInfo, VoiceChannelInfo,
    VoiceStateEvent,
};

/// Abstraction over the chat platform's guild operations.
///
/// Creations are not deduplicated here; callers look up by topic or name
/// before creating.
pub trait ChatGateway: Send + Sync {
    /// List every channel and category the guild currently has.
    fn snapshot(&self) -> BoxFuture<'static, ChatResult<GuildSnapshot>>;
    /// Create a channel category.
    fn create_category(&self, name: &str) -> BoxFuture<'static, ChatResult<CategoryInfo>>;
    /// Create a text channel with the given topic under a category.
    fn create_text_channel(
        &self,
        name: &str,
        topic: &str,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<TextChannelInfo>>;
    /// Create a voice channel under a category.
    fn create_voice_channel(
        &self,
        name: &str,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<VoiceChannelInfo>>;
    /// Re-parent a channel under another category.
    fn move_channel(
        &self,
        channel: ChannelId,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<()>>;
    /// Rename a channel in place.
    fn rename_channel(&self, channel: ChannelId, name: &str)
    -> BoxFuture<'static, ChatResult<()>>;
    /// Delete a channel.
    fn delete_channel(&self, channel: ChannelId) -> BoxFuture<'static, ChatResult<()>>;
    /// Post a message to a text channel.
    fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
    ) -> BoxFuture<'static, ChatResult<MessageId>>;
    /// Pin a previously posted message.
    fn pin_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> BoxFuture<'static, ChatResult<()>>;
    /// Record a member moving between voice channels so later snapshots
    /// report correct occupancy.
    fn apply_voice_state(&self, event: VoiceStateEvent) -> BoxFuture<'static, ChatResult<()>>;
    /// Mention string for the guild's admin role, when one exists.
    fn admin_mention(&self) -> BoxFuture<'static, ChatResult<Option<String>>>;
}
