use std::{collections::HashSet, sync::Arc};

use dashmap::DashMap;
use futures::future::BoxFuture;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

use crate::dao::chat::{
    ChatGateway,
    error::{ChatError, ChatResult},
    models::{
        CategoryInfo, ChannelId, GuildSnapshot, MessageId, TextChannelInfo, VoiceChannelInfo,
        VoiceStateEvent,
    },
};

use super::{
    config::DiscordConfig,
    wire::{
        CHANNEL_TYPE_CATEGORY, CHANNEL_TYPE_TEXT, CHANNEL_TYPE_VOICE, ChannelPayload,
        CreateChannelRequest, CreateMessageRequest, MessagePayload, ModifyChannelRequest,
        RolePayload,
    },
};

/// Role name whose mention is attached to capacity alerts.
const ADMIN_ROLE_NAME: &str = "@admin";

/// REST-backed [`ChatGateway`] for Discord guilds.
///
/// Voice occupancy is not part of the REST channel listing; the host relays
/// voice-state events through [`ChatGateway::apply_voice_state`] and the
/// client folds the resulting per-channel member sets into every snapshot.
#[derive(Clone)]
pub struct DiscordGateway {
    client: Client,
    base_url: Arc<str>,
    token: Arc<str>,
    guild_id: ChannelId,
    occupancy: Arc<DashMap<ChannelId, HashSet<String>>>,
}

impl DiscordGateway {
    /// Build a client and verify the token by listing the guild's channels once.
    pub async fn connect(config: DiscordConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| ChatError::ClientBuilder { source })?;

        let gateway = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            token: Arc::<str>::from(config.token),
            guild_id: config.guild_id,
            occupancy: Arc::new(DashMap::new()),
        };

        gateway.fetch_channels().await?;
        Ok(gateway)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bot {}", self.token))
    }

    async fn send_json<T>(&self, builder: reqwest::RequestBuilder, path: &str) -> ChatResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| ChatError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::RequestStatus {
                path: path.to_string(),
                status,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ChatError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn send_expect_success(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> ChatResult<()> {
        let response = builder
            .send()
            .await
            .map_err(|source| ChatError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ChatError::RequestStatus {
                path: path.to_string(),
                status,
            })
        }
    }

    async fn fetch_channels(&self) -> ChatResult<Vec<ChannelPayload>> {
        let path = format!("guilds/{}/channels", self.guild_id);
        self.send_json(self.request(Method::GET, &path), &path).await
    }

    async fn create_channel(&self, body: CreateChannelRequest) -> ChatResult<ChannelPayload> {
        let path = format!("guilds/{}/channels", self.guild_id);
        self.send_json(self.request(Method::POST, &path).json(&body), &path)
            .await
    }

    fn occupants_of(&self, channel: ChannelId) -> usize {
        self.occupancy
            .get(&channel)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    fn snapshot_from(&self, channels: Vec<ChannelPayload>) -> ChatResult<GuildSnapshot> {
        let path = format!("guilds/{}/channels", self.guild_id);
        let mut snapshot = GuildSnapshot::default();

        for channel in channels {
            let id = parse_snowflake(&path, &channel.id)?;
            let parent_id = channel
                .parent_id
                .as_deref()
                .map(|raw| parse_snowflake(&path, raw))
                .transpose()?;

            match channel.kind {
                CHANNEL_TYPE_CATEGORY => snapshot.categories.push(CategoryInfo {
                    id,
                    name: channel.name,
                }),
                CHANNEL_TYPE_TEXT => snapshot.text_channels.push(TextChannelInfo {
                    id,
                    name: channel.name,
                    topic: channel.topic,
                    parent_id,
                }),
                CHANNEL_TYPE_VOICE => snapshot.voice_channels.push(VoiceChannelInfo {
                    id,
                    name: channel.name,
                    parent_id,
                    occupants: self.occupants_of(id),
                }),
                // Threads, announcement channels, and the rest are invisible
                // to the puzzle lifecycle.
                _ => {}
            }
        }

        Ok(snapshot)
    }
}

fn parse_snowflake(path: &str, value: &str) -> ChatResult<ChannelId> {
    value
        .parse::<ChannelId>()
        .map_err(|_| ChatError::InvalidSnowflake {
            path: path.to_string(),
            value: value.to_string(),
        })
}

impl ChatGateway for DiscordGateway {
    fn snapshot(&self) -> BoxFuture<'static, ChatResult<GuildSnapshot>> {
        let gateway = self.clone();
        Box::pin(async move {
            let channels = gateway.fetch_channels().await?;
            gateway.snapshot_from(channels)
        })
    }

    fn create_category(&self, name: &str) -> BoxFuture<'static, ChatResult<CategoryInfo>> {
        let gateway = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            let path = format!("guilds/{}/channels", gateway.guild_id);
            let payload = gateway
                .create_channel(CreateChannelRequest {
                    name,
                    kind: CHANNEL_TYPE_CATEGORY,
                    topic: None,
                    parent_id: None,
                })
                .await?;
            Ok(CategoryInfo {
                id: parse_snowflake(&path, &payload.id)?,
                name: payload.name,
            })
        })
    }

    fn create_text_channel(
        &self,
        name: &str,
        topic: &str,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<TextChannelInfo>> {
        let gateway = self.clone();
        let name = name.to_string();
        let topic = topic.to_string();
        Box::pin(async move {
            let path = format!("guilds/{}/channels", gateway.guild_id);
            let payload = gateway
                .create_channel(CreateChannelRequest {
                    name,
                    kind: CHANNEL_TYPE_TEXT,
                    topic: Some(topic),
                    parent_id: Some(parent.to_string()),
                })
                .await?;
            let id = parse_snowflake(&path, &payload.id)?;
            Ok(TextChannelInfo {
                id,
                name: payload.name,
                topic: payload.topic,
                parent_id: Some(parent),
            })
        })
    }

    fn create_voice_channel(
        &self,
        name: &str,
        parent: ChannelId,
    ) -> BoxFuture<'static, ChatResult<VoiceChannelInfo>> {
        let gateway = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            let path = format!("guilds/{}/channels", gateway.guild_id);
            let payload = gateway
                .create_channel(CreateChannelRequest {
                    name,
                    kind: CHANNEL_TYPE_VOICE,
                    topic: None,
                    parent_id: Some(parent.to_string()),
                })
                .await?;
            let id = parse_snowflake(&path, &payload.id)?;
            Ok(VoiceChannelInfo {
                id,
                name: payload.name,
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
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("channels/{channel}");
            let body = ModifyChannelRequest {
                name: None,
                parent_id: Some(parent.to_string()),
            };
            gateway
                .send_expect_success(gateway.request(Method::PATCH, &path).json(&body), &path)
                .await
        })
    }

    fn rename_channel(
        &self,
        channel: ChannelId,
        name: &str,
    ) -> BoxFuture<'static, ChatResult<()>> {
        let gateway = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            let path = format!("channels/{channel}");
            let body = ModifyChannelRequest {
                name: Some(name),
                parent_id: None,
            };
            gateway
                .send_expect_success(gateway.request(Method::PATCH, &path).json(&body), &path)
                .await
        })
    }

    fn delete_channel(&self, channel: ChannelId) -> BoxFuture<'static, ChatResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("channels/{channel}");
            gateway
                .send_expect_success(gateway.request(Method::DELETE, &path), &path)
                .await?;
            gateway.occupancy.remove(&channel);
            Ok(())
        })
    }

    fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
    ) -> BoxFuture<'static, ChatResult<MessageId>> {
        let gateway = self.clone();
        let content = content.to_string();
        Box::pin(async move {
            let path = format!("channels/{channel}/messages");
            let payload: MessagePayload = gateway
                .send_json(
                    gateway
                        .request(Method::POST, &path)
                        .json(&CreateMessageRequest { content }),
                    &path,
                )
                .await?;
            parse_snowflake(&path, &payload.id)
        })
    }

    fn pin_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> BoxFuture<'static, ChatResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("channels/{channel}/pins/{message}");
            gateway
                .send_expect_success(gateway.request(Method::PUT, &path), &path)
                .await
        })
    }

    fn apply_voice_state(&self, event: VoiceStateEvent) -> BoxFuture<'static, ChatResult<()>> {
        let gateway = self.clone();
        Box::pin(async move {
            if let Some(left) = event.left {
                if let Some(mut members) = gateway.occupancy.get_mut(&left) {
                    members.remove(&event.member);
                }
            }
            if let Some(joined) = event.joined {
                gateway
                    .occupancy
                    .entry(joined)
                    .or_default()
                    .insert(event.member);
            }
            Ok(())
        })
    }

    fn admin_mention(&self) -> BoxFuture<'static, ChatResult<Option<String>>> {
        let gateway = self.clone();
        Box::pin(async move {
            let path = format!("guilds/{}/roles", gateway.guild_id);
            let roles: Vec<RolePayload> = gateway
                .send_json(gateway.request(Method::GET, &path), &path)
                .await?;
            Ok(roles
                .into_iter()
                .find(|role| role.name == ADMIN_ROLE_NAME)
                .map(|role| format!("<@&{}>", role.id)))
        })
    }
}
