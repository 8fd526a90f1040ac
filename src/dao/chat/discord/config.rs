use super::super::error::{ChatError, ChatResult};

/// Default REST endpoint of the Discord API.
const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";

/// Runtime configuration describing how to reach the Discord REST API.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Base URL of the REST API, overridable for tests and proxies.
    pub base_url: String,
    /// Bot token used for the `Authorization` header.
    pub token: String,
    /// Identifier of the guild the hunt runs in.
    pub guild_id: u64,
}

impl DiscordConfig {
    /// Construct a configuration from an explicit token and guild.
    pub fn new(token: impl Into<String>, guild_id: u64) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            guild_id,
        }
    }

    /// Point the client at a non-default REST endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> ChatResult<Self> {
        let token = std::env::var("DISCORD_TOKEN").map_err(|_| ChatError::MissingEnvVar {
            var: "DISCORD_TOKEN",
        })?;
        let guild_raw = std::env::var("DISCORD_GUILD_ID").map_err(|_| {
            ChatError::MissingEnvVar {
                var: "DISCORD_GUILD_ID",
            }
        })?;
        let guild_id = guild_raw.parse::<u64>().map_err(|_| ChatError::InvalidEnvVar {
            var: "DISCORD_GUILD_ID",
        })?;

        let mut config = Self::new(token, guild_id);
        if let Ok(base_url) = std::env::var("DISCORD_API_BASE") {
            config = config.with_base_url(base_url);
        }

        Ok(config)
    }
}
