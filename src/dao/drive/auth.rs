//! Access-token lifecycle for the document store.
//!
//! Every drive operation goes through [`TokenBroker::access_token`], which
//! refreshes the token when it has expired, persists the refreshed blob
//! through the injected [`CredentialStore`], and falls back to the host's
//! [`Reauthenticator`] capability when the refresh grant is rejected.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::error::{DriveError, DriveResult};

/// Opaque credential blob the host persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Bearer token presented on every drive request.
    pub access_token: String,
    /// Long-lived token exchanged for fresh access tokens.
    pub refresh_token: Option<String>,
    /// Instant the access token stops being accepted, when known.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl StoredCredentials {
    /// Whether the access token must be refreshed before use.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }
}

/// Persistence capability for the credential blob.
pub trait CredentialStore: Send + Sync {
    /// Load the previously persisted blob, if any.
    fn load(&self) -> DriveResult<Option<StoredCredentials>>;
    /// Persist the blob after a successful refresh.
    fn save(&self, credentials: &StoredCredentials) -> DriveResult<()>;
}

/// Interactive re-authentication capability supplied by the host.
///
/// Invoked only when a refresh grant is rejected; headless deployments use
/// [`UnattendedReauth`] and treat the failure as fatal.
pub trait Reauthenticator: Send + Sync {
    /// Obtain a fresh credential blob through whatever flow the host offers.
    fn reauthenticate(&self) -> BoxFuture<'static, DriveResult<StoredCredentials>>;
}

/// [`CredentialStore`] writing the blob as a JSON file.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store credentials at the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> DriveResult<Option<StoredCredentials>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(DriveError::CredentialIo { source: err }),
        };
        let credentials = serde_json::from_str(&contents)
            .map_err(|source| DriveError::CredentialFormat { source })?;
        Ok(Some(credentials))
    }

    fn save(&self, credentials: &StoredCredentials) -> DriveResult<()> {
        let contents = serde_json::to_string_pretty(credentials)
            .map_err(|source| DriveError::CredentialFormat { source })?;
        fs::write(&self.path, contents).map_err(|source| DriveError::CredentialIo { source })?;
        info!(path = %self.path.display(), "persisted refreshed drive credentials");
        Ok(())
    }
}

/// [`Reauthenticator`] for deployments with no interactive flow available.
pub struct UnattendedReauth;

impl Reauthenticator for UnattendedReauth {
    fn reauthenticate(&self) -> BoxFuture<'static, DriveResult<StoredCredentials>> {
        Box::pin(async { Err(DriveError::ReauthenticationRequired) })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Refresh-on-expiry access token source shared by all drive operations.
pub struct TokenBroker {
    client: Client,
    token_url: Arc<str>,
    client_id: Arc<str>,
    client_secret: Arc<str>,
    credentials: Mutex<StoredCredentials>,
    store: Arc<dyn CredentialStore>,
    reauth: Arc<dyn Reauthenticator>,
}

impl TokenBroker {
    /// Wire a broker around an initial credential blob.
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        initial: StoredCredentials,
        store: Arc<dyn CredentialStore>,
        reauth: Arc<dyn Reauthenticator>,
    ) -> Self {
        Self {
            client,
            token_url: Arc::<str>::from(token_url.into()),
            client_id: Arc::<str>::from(client_id.into()),
            client_secret: Arc::<str>::from(client_secret.into()),
            credentials: Mutex::new(initial),
            store,
            reauth,
        }
    }

    /// Return a token valid for immediate use, refreshing it when expired.
    pub async fn access_token(&self) -> DriveResult<String> {
        let mut credentials = self.credentials.lock().await;
        if !credentials.is_expired(OffsetDateTime::now_utc()) {
            return Ok(credentials.access_token.clone());
        }

        match self.refresh(&credentials).await {
            Ok(fresh) => {
                *credentials = fresh;
            }
            Err(err) => {
                warn!(error = %err, "drive token refresh failed; invoking re-authentication");
                *credentials = self.reauth.reauthenticate().await?;
            }
        }

        self.store.save(&credentials)?;
        Ok(credentials.access_token.clone())
    }

    async fn refresh(&self, current: &StoredCredentials) -> DriveResult<StoredCredentials> {
        let refresh_token = current
            .refresh_token
            .clone()
            .ok_or(DriveError::ReauthenticationRequired)?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_ref()),
            ("client_secret", self.client_secret.as_ref()),
        ];

        let response = self
            .client
            .post(self.token_url.as_ref())
            .form(&params)
            .send()
            .await
            .map_err(|source| DriveError::TokenRefresh {
                source: Box::new(DriveError::RequestSend {
                    path: self.token_url.to_string(),
                    source,
                }),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::TokenRefresh {
                source: Box::new(DriveError::RequestStatus {
                    path: self.token_url.to_string(),
                    status,
                }),
            });
        }

        let payload: TokenResponse =
            response
                .json()
                .await
                .map_err(|source| DriveError::TokenRefresh {
                    source: Box::new(DriveError::DecodeResponse {
                        path: self.token_url.to_string(),
                        source,
                    }),
                })?;

        Ok(StoredCredentials {
            access_token: payload.access_token,
            // The token endpoint only rotates the refresh token sometimes.
            refresh_token: payload.refresh_token.or(Some(refresh_token)),
            expires_at: payload
                .expires_in
                .map(|seconds| OffsetDateTime::now_utc() + Duration::seconds(seconds)),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn token_without_known_expiry_is_not_expired() {
        let credentials = StoredCredentials {
            access_token: "token".into(),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!credentials.is_expired(datetime!(2026-01-01 00:00 UTC)));
    }

    #[test]
    fn token_past_expiry_is_expired() {
        let credentials = StoredCredentials {
            access_token: "token".into(),
            refresh_token: None,
            expires_at: Some(datetime!(2026-01-01 00:00 UTC)),
        };
        assert!(credentials.is_expired(datetime!(2026-01-01 00:00 UTC)));
        assert!(!credentials.is_expired(datetime!(2025-12-31 23:59 UTC)));
    }
}
