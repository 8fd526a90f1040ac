//! In-memory [`ChatGateway`] backend.
//!
//! Behaves like a tiny guild: channels get sequential identifiers, voice
//! occupancy is tracked per channel, and pinned messages are recorded.
//! Service tests drive it directly; it is also handy for dry-running the
//! lifecycle without touching a live guild.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use futures::future::BoxFuture;

use super::{
    ChatGateway,
    error::ChatResult,
    models::{
        CategoryInfo, ChannelId, GuildSnapshot, MessageId, TextChannelInfo, VoiceChannelInfo,
        VoiceStateEvent,
    },
};

#[derive(Debug, Default)]
struct StoredVoice {
    id: ChannelId,
    name: String,
    parent_id: Option<ChannelId>,
    members: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: ChannelId,
    categories: Vec<CategoryInfo>,
    text_channels: Vec<TextChannelInfo>,
    voice_channels: Vec<StoredVoice>,
    messages: HashMap<ChannelId, Vec<(MessageId, String)>>,
    pins: HashMap<ChannelId, Vec<MessageId>>,
    admin_mention: Option<String>,
}

impl Inner {
    fn allocate_id(&mut self) -> ChannelId {
        self.next_id += 1;
        self.next_id
    }
}

/// Guild state held entirely in process memory.
#[derive(Clone, Default)]
pub struct MemoryGuild {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryGuild {
    /// Create an empty guild.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mention string returned for the admin role.
    pub fn set_admin_mention(&self, mention: impl Into<String>) {
        self.inner.lock().unwrap().admin_mention = Some(mention.into());
    }

    /// Connect a member to a voice channel by name; panics when the channel
    /// does not exist (test setup error).
    pub fn occupy(&self, channel_name: &str, member: impl Into<String>) {
        let mut inner = self.inner.lock().unwrap();
        let channel = inner
            .voice_channels
            .iter_mut()
            .find(|channel| channel.name == channel_name)
            .expect("voice channel exists");
        channel.members.push(member.into());
    }

    /// Identifier of the voice channel with this name, if present.
    pub fn voice_channel_id(&self, name: &str) -> Option<ChannelId> {
        self.inner
            .lock()
            .unwrap()
            .voice_channels
            .iter()
            .find(|channel| channel.name == name)
            .map(|channel| channel.id)
    }

    /// Contents of the messages pinned in a channel, oldest first.
    pub fn pinned_contents(&self, channel: ChannelId) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let Some(pins) = inner.pins.get(&channel) else {
            return Vec::new();
        };
        let Some(messages) = inner.messages.get(&channel) else {
            return Vec::new();
        };
        pins.iter()
            .filter_map(|pin| {
                messages
                    .iter()
                    .find(|(id, _)| id == pin)
                    .map(|(_, content)| content.clone())
            })
            .collect()
    }

    /// Messages posted to a channel, oldest first.
    pub fn message_contents(&self, channel: ChannelId) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .messages
            .get(&channel)
            .map(|messages| messages.iter().map(|(_, content)| content.clone()).collect())
            .unwrap_or_default()
    }
}

impl ChatGateway for MemoryGuild {
    fn snapshot(&self) -> BoxFuture<'static, ChatResult<GuildSnapshot>> {
        let guild = self.clone();
        Box::pin(async move {
            let inner = guild.inner.lock().unwrap();
            Ok(GuildSnapshot {
                categories: inner.categories.clone(),
                text_channels: inner.text_channels.clone(),
                voice_channels: inner
                    .voice_channels
                    .iter()
                    .map(|channel| VoiceChannelInfo {
                        id: channel.id,
                        name: channel.name.clone(),
                        parent_id: channel.parent_id,
                        occupants: channel.members.len(),
                    })
                    .collect(),
            })
        })
    }

    fn create_category(&self, name: &str) -> BoxFuture<'static, ChatResult<CategoryInfo>> {
        let guild = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            let id = inner.allocate_id();
            let category = CategoryInfo { id, name };
            inner.categories.push(category.clone());
            Ok(category)
        })
    }

    fn create_text_channel(
        &self,
        name: &str,
        topic: &str,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<TextChannelInfo>> {
        let guild = self.clone();
        let name = name.to_string();
        let topic = topic.to_string();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            let id = inner.allocate_id();
            let channel = TextChannelInfo {
                id,
                name,
                topic: Some(topic),
                parent_id: Some(parent),
            };
            inner.text_channels.push(channel.clone());
            Ok(channel)
        })
    }

    fn create_voice_channel(
        &self,
        name: &str,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<VoiceChannelInfo>> {
        let guild = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            let id = inner.allocate_id();
            inner.voice_channels.push(StoredVoice {
                id,
                name: name.clone(),
                parent_id: Some(parent),
                members: Vec::new(),
            });
            Ok(VoiceChannelInfo {
                id,
                name,
                parent_id: Some(parent),
                occupants: 0,
            })
        })
    }

    fn move_channel(
        &self,
        channel: ChannelId,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<()>> {
        let guild = self.clone();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            if let Some(text) = inner
                .text_channels
                .iter_mut()
                .find(|existing| existing.id == channel)
            {
                text.parent_id = Some(parent);
            } else if let Some(voice) = inner
                .voice_channels
                .iter_mut()
                .find(|existing| existing.id == channel)
            {
                voice.parent_id = Some(parent);
            }
            Ok(())
        })
    }

    fn rename_channel(
        &self,
        channel: ChannelId,
        name: &str,
    ) -> BoxFuture<'static, ChatResult<()>> {
        let guild = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            if let Some(text) = inner
                .text_channels
                .iter_mut()
                .find(|existing| existing.id == channel)
            {
                text.name = name;
            } else if let Some(voice) = inner
                .voice_channels
                .iter_mut()
                .find(|existing| existing.id == channel)
            {
                voice.name = name;
            }
            Ok(())
        })
    }

    fn delete_channel(&self, channel: ChannelId) -> BoxFuture<'static, ChatResult<()>> {
        let guild = self.clone();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            inner.text_channels.retain(|existing| existing.id != channel);
            inner.voice_channels.retain(|existing| existing.id != channel);
            inner.categories.retain(|existing| existing.id != channel);
            inner.messages.remove(&channel);
            inner.pins.remove(&channel);
            Ok(())
        })
    }

    fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
    ) -> BoxFuture<'static, ChatResult<MessageId>> {
        let guild = self.clone();
        let content = content.to_string();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            let id = inner.allocate_id();
            inner.messages.entry(channel).or_default().push((id, content));
            Ok(id)
        })
    }

    fn pin_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> BoxFuture<'static, ChatResult<()>> {
        let guild = self.clone();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            inner.pins.entry(channel).or_default().push(message);
            Ok(())
        })
    }

    fn apply_voice_state(&self, event: VoiceStateEvent) -> BoxFuture<'static, ChatResult<()>> {
        let guild = self.clone();
        Box::pin(async move {
            let mut inner = guild.inner.lock().unwrap();
            if let Some(left) = event.left {
                if let Some(channel) = inner
                    .voice_channels
                    .iter_mut()
                    .find(|existing| existing.id == left)
                {
                    channel.members.retain(|member| member != &event.member);
                }
            }
            if let Some(joined) = event.joined {
                if let Some(channel) = inner
                    .voice_channels
                    .iter_mut()
                    .find(|existing| existing.id == joined)
                {
                    channel.members.push(event.member.clone());
                }
            }
            Ok(())
        })
    }

    fn admin_mention(&self) -> BoxFuture<'static, ChatResult<Option<String>>> {
        let guild = self.clone();
        Box::pin(async move { Ok(guild.inner.lock().unwrap().admin_mention.clone()) })
    }
}
