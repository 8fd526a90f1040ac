//! Plain data views of the guild as the chat platform reports it.

/// Identifier the chat platform assigns to channels, categories, and roles.
pub type ChannelId = u64;

/// Identifier the chat platform assigns to messages.
pub type MessageId = u64;

/// A channel category as listed by the guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Platform identifier of the category.
    pub id: ChannelId,
    /// Display name of the category.
    pub name: String,
}

/// A text channel as listed by the guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChannelInfo {
    /// Platform identifier of the channel.
    pub id: ChannelId,
    /// Display name of the channel.
    pub name: String,
    /// Channel topic; puzzle channels carry the puzzle title here.
    pub topic: Option<String>,
    /// Category the channel is parented under, if any.
    pub parent_id: Option<ChannelId>,
}

/// A voice channel as listed by the guild, with its current occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChannelInfo {
    /// Platform identifier of the channel.
    pub id: ChannelId,
    /// Display name of the channel.
    pub name: String,
    /// Category the channel is parented under, if any.
    pub parent_id: Option<ChannelId>,
    /// Number of members currently connected to the channel.
    pub occupants: usize,
}

/// Point-in-time listing of every channel and category in the guild.
///
/// Puzzle state is always derived from a fresh snapshot; nothing here is
/// cached between commands.
#[derive(Debug, Clone, Default)]
pub struct GuildSnapshot {
    /// All categories in the guild.
    pub categories: Vec<CategoryInfo>,
    /// All text channels in the guild.
    pub text_channels: Vec<TextChannelInfo>,
    /// All voice channels in the guild.
    pub voice_channels: Vec<VoiceChannelInfo>,
}

/// A single member moving between voice channels, as relayed by the host's
/// gateway connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceStateEvent {
    /// Platform identifier of the member that moved.
    pub member: String,
    /// Channel the member disconnected from, if any.
    pub left: Option<ChannelId>,
    /// Channel the member connected to, if any.
    pub joined: Option<ChannelId>,
}
