use std::path::PathBuf;

use super::error::{DriveError, DriveResult};

/// Default REST endpoint of the Google Drive API.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
/// Default OAuth token endpoint used for refresh grants.
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Default location of the persisted credential blob.
const DEFAULT_CREDENTIALS_PATH: &str = "drive_credentials.json";

/// Runtime configuration describing how to reach the document store.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Base URL of the REST API, overridable for tests and proxies.
    pub base_url: String,
    /// OAuth token endpoint used for refresh grants.
    pub token_url: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Where the refreshed credential blob is persisted between runs.
    pub credentials_path: PathBuf,
}

impl DriveConfig {
    /// Construct a configuration from explicit OAuth client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }

    /// Point the client at a non-default REST endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> DriveResult<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").map_err(|_| {
            DriveError::MissingEnvVar {
                var: "GOOGLE_CLIENT_ID",
            }
        })?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").map_err(|_| {
            DriveError::MissingEnvVar {
                var: "GOOGLE_CLIENT_SECRET",
            }
        })?;

        let mut config = Self::new(client_id, client_secret);
        if let Ok(base_url) = std::env::var("DRIVE_API_BASE") {
            config.base_url = base_url;
        }
        if let Ok(token_url) = std::env::var("GOOGLE_TOKEN_URL") {
            config.token_url = token_url;
        }
        if let Ok(path) = std::env::var("DRIVE_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(path);
        }

        Ok(config)
    }
}
