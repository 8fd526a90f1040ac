//! Serde models for the subset of the Discord REST API the bot uses.

use serde::{Deserialize, Serialize};

/// Channel type tag for guild text channels.
pub const CHANNEL_TYPE_TEXT: u8 = 0;
/// Channel type tag for guild voice channels.
pub const CHANNEL_TYPE_VOICE: u8 = 2;
/// Channel type tag for channel categories.
pub const CHANNEL_TYPE_CATEGORY: u8 = 4;

/// Channel object as returned by the channel list and creation endpoints.
///
/// Snowflakes arrive as decimal strings and are parsed by the client.
#[derive(Debug, Deserialize)]
pub struct ChannelPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Body for `POST /guilds/{guild}/channels`.
#[derive(Debug, Serialize)]
pub struct CreateChannelRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Body for `PATCH /channels/{id}`; absent fields are left untouched.
#[derive(Debug, Serialize)]
pub struct ModifyChannelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Body for `POST /channels/{id}/messages`.
#[derive(Debug, Serialize)]
pub struct CreateMessageRequest {
    pub content: String,
}

/// Message object; only the identifier is needed for pinning.
#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    pub id: String,
}

/// Role object as returned by `GET /guilds/{guild}/roles`.
#[derive(Debug, Deserialize)]
pub struct RolePayload {
    pub id: String,
    pub name: String,
}
