//! Read-through view of the guild's channels and categories.

use std::sync::Arc;

use crate::dao::chat::{
    CategoryInfo, ChannelId, ChatGateway, ChatResult, GuildSnapshot, MessageId, TextChannelInfo,
    VoiceChannelInfo, VoiceStateEvent,
};

/// Filtered lookups and write passthroughs over the chat gateway.
///
/// Nothing is cached: every lookup starts from a fresh snapshot, trading an
/// extra listing call per command for never holding stale channel state.
#[derive(Clone)]
pub struct ChannelDirectory {
    gateway: Arc<dyn ChatGateway>,
}

impl ChannelDirectory {
    /// Wrap a gateway backend.
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }

    /// Fresh listing of the guild's channels and categories.
    pub async fn snapshot(&self) -> ChatResult<GuildSnapshot> {
        self.gateway.snapshot().await
    }

    /// Text channel whose topic equals the given puzzle title.
    pub async fn text_channel_by_topic(&self, topic: &str) -> ChatResult<Option<TextChannelInfo>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .text_channels
            .into_iter()
            .find(|channel| channel.topic.as_deref() == Some(topic)))
    }

    /// Voice channel with the given name.
    pub async fn voice_channel_by_name(&self, name: &str) -> ChatResult<Option<VoiceChannelInfo>> {
        let snapshot = self.snapshot().await?;
        Ok(snapshot
            .voice_channels
            .into_iter()
            .find(|channel| channel.name == name))
    }

    /// Category with the given exact name.
    pub async fn category_by_name(&self, name: &str) -> ChatResult<Option<CategoryInfo>> {
        let snapshot = self.snapshot().await?;
        Ok(find_category(&snapshot, name).cloned())
    }

    /// Category with the given exact name, created when absent.
    pub async fn find_or_create_category(&self, name: &str) -> ChatResult<CategoryInfo> {
        if let Some(existing) = self.category_by_name(name).await? {
            return Ok(existing);
        }
        self.gateway.create_category(name).await
    }

    /// Create a category with the given name.
    pub async fn create_category(&self, name: &str) -> ChatResult<CategoryInfo> {
        self.gateway.create_category(name).await
    }

    /// Create a text channel with the given topic under a category.
    pub async fn create_text_channel(
        &self,
        name: &str,
        topic: &str,
        parent: ChannelId,
    ) -> ChatResult<TextChannelInfo> {
        self.gateway.create_text_channel(name, topic, parent).await
    }

    /// Create a voice channel under a category.
    pub async fn create_voice_channel(
        &self,
        name: &str,
        parent: ChannelId,
    ) -> ChatResult<VoiceChannelInfo> {
        self.gateway.create_voice_channel(name, parent).await
    }

    /// Re-parent a channel under another category.
    pub async fn move_channel(&self, channel: ChannelId, parent: ChannelId) -> ChatResult<()> {
        self.gateway.move_channel(channel, parent).await
    }

    /// Rename a channel in place.
    pub async fn rename_channel(&self, channel: ChannelId, name: &str) -> ChatResult<()> {
        self.gateway.rename_channel(channel, name).await
    }

    /// Delete a channel.
    pub async fn delete_channel(&self, channel: ChannelId) -> ChatResult<()> {
        self.gateway.delete_channel(channel).await
    }

    /// Post a message to a text channel.
    pub async fn send_message(&self, channel: ChannelId, content: &str) -> ChatResult<MessageId> {
        self.gateway.send_message(channel, content).await
    }

    /// Pin a previously posted message.
    pub async fn pin_message(&self, channel: ChannelId, message: MessageId) -> ChatResult<()> {
        self.gateway.pin_message(channel, message).await
    }

    /// Fold a voice-state event into the gateway's occupancy view.
    pub async fn apply_voice_state(&self, event: VoiceStateEvent) -> ChatResult<()> {
        self.gateway.apply_voice_state(event).await
    }

    /// Mention string for the guild's admin role, when one exists.
    pub async fn admin_mention(&self) -> ChatResult<Option<String>> {
        self.gateway.admin_mention().await
    }
}

/// Category with the given exact name inside a snapshot.
pub fn find_category<'a>(snapshot: &'a GuildSnapshot, name: &str) -> Option<&'a CategoryInfo> {
    snapshot.categories.iter().find(|category| category.name == name)
}

/// The Solved category chain: `Solved`, `Solved 2`, `Solved 3`, … probed by
/// sequential suffix until the first gap.
pub fn solved_category_chain(snapshot: &GuildSnapshot, solved_prefix: &str) -> Vec<CategoryInfo> {
    let mut chain = Vec::new();
    for index in 1.. {
        let name = if index == 1 {
            solved_prefix.to_string()
        } else {
            format!("{solved_prefix} {index}")
        };
        match find_category(snapshot, &name) {
            Some(category) => chain.push(category.clone()),
            None => break,
        }
    }
    chain
}

/// Number of channels of any kind parented under a category.
pub fn channels_in(snapshot: &GuildSnapshot, category: ChannelId) -> usize {
    let text = snapshot
        .text_channels
        .iter()
        .filter(|channel| channel.parent_id == Some(category))
        .count();
    let voice = snapshot
        .voice_channels
        .iter()
        .filter(|channel| channel.parent_id == Some(category))
        .count();
    text + voice
}

/// Number of text channels parented under a category.
pub fn text_channels_in(snapshot: &GuildSnapshot, category: ChannelId) -> usize {
    snapshot
        .text_channels
        .iter()
        .filter(|channel| channel.parent_id == Some(category))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_categories(names: &[&str]) -> GuildSnapshot {
        GuildSnapshot {
            categories: names
                .iter()
                .enumerate()
                .map(|(index, name)| CategoryInfo {
                    id: index as u64 + 1,
                    name: (*name).to_string(),
                })
                .collect(),
            ..GuildSnapshot::default()
        }
    }

    #[test]
    fn chain_stops_at_the_first_suffix_gap() {
        let snapshot = snapshot_with_categories(&["Solved", "Solved 2", "Solved 4"]);
        let chain = solved_category_chain(&snapshot, "Solved");
        let names: Vec<&str> = chain.iter().map(|category| category.name.as_str()).collect();
        assert_eq!(names, ["Solved", "Solved 2"]);
    }

    #[test]
    fn chain_is_empty_without_a_primary_category() {
        let snapshot = snapshot_with_categories(&["Solved 2"]);
        assert!(solved_category_chain(&snapshot, "Solved").is_empty());
    }

    #[test]
    fn channel_counts_are_scoped_to_the_category() {
        let mut snapshot = snapshot_with_categories(&["Solved"]);
        snapshot.text_channels = vec![
            TextChannelInfo {
                id: 10,
                name: "one".into(),
                topic: None,
                parent_id: Some(1),
            },
            TextChannelInfo {
                id: 11,
                name: "two".into(),
                topic: None,
                parent_id: None,
            },
        ];
        snapshot.voice_channels = vec![VoiceChannelInfo {
            id: 12,
            name: "three".into(),
            parent_id: Some(1),
            occupants: 0,
        }];
        assert_eq!(channels_in(&snapshot, 1), 2);
        assert_eq!(text_channels_in(&snapshot, 1), 1);
    }
}
