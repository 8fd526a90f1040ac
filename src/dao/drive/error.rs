//! Error types shared by the document store backends.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`DriveError`] failures.
pub type DriveResult<T> = Result<T, DriveError>;

/// Failures that can occur while interacting with the document store.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Required environment variable is missing.
    #[error("missing drive environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build drive client")]
    ClientBuilder {
        /// Underlying builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The configured root folder does not exist in the store.
    ///
    /// Fatal at startup: the adapter has no destination for new spreadsheets.
    #[error("root folder `{name}` not found in the document store")]
    RootFolderMissing {
        /// Configured folder name.
        name: String,
    },
    /// A request to a drive endpoint could not be sent.
    #[error("failed to send drive request to `{path}`")]
    RequestSend {
        /// Endpoint path the request targeted.
        path: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The store returned an unexpected status code.
    #[error("unexpected drive response status {status} for `{path}`")]
    RequestStatus {
        /// Endpoint path the request targeted.
        path: String,
        /// Status code the store answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode drive response for `{path}`")]
    DecodeResponse {
        /// Endpoint path the request targeted.
        path: String,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
    /// The token endpoint rejected a refresh attempt.
    #[error("failed to refresh drive access token")]
    TokenRefresh {
        /// Underlying transport or status failure.
        #[source]
        source: Box<DriveError>,
    },
    /// No refresh token is available and no interactive flow can run.
    #[error("drive credentials require interactive re-authentication")]
    ReauthenticationRequired,
    /// Reading or writing the persisted credential blob failed.
    #[error("failed to access persisted drive credentials")]
    CredentialIo {
        /// Underlying filesystem failure.
        #[source]
        source: std::io::Error,
    },
    /// The persisted credential blob is not valid JSON.
    #[error("failed to parse persisted drive credentials")]
    CredentialFormat {
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
}
