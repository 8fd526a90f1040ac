//! Error types shared by the chat platform backends.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`ChatError`] failures.
pub type ChatResult<T> = Result<T, ChatError>;

/// Failures that can occur while talking to the chat platform.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Required environment variable is missing.
    #[error("missing chat environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the missing variable.
        var: &'static str,
    },
    /// Environment variable is present but cannot be parsed.
    #[error("invalid chat environment variable `{var}`")]
    InvalidEnvVar {
        /// Name of the malformed variable.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build chat client")]
    ClientBuilder {
        /// Underlying builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request to a chat endpoint could not be sent.
    #[error("failed to send chat request to `{path}`")]
    RequestSend {
        /// Endpoint path the request targeted.
        path: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The chat platform returned an unexpected status code.
    #[error("unexpected chat response status {status} for `{path}`")]
    RequestStatus {
        /// Endpoint path the request targeted.
        path: String,
        /// Status code the platform answered with.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode chat response for `{path}`")]
    DecodeResponse {
        /// Endpoint path the request targeted.
        path: String,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
    /// A snowflake field in a response was not a valid integer.
    #[error("invalid snowflake `{value}` in chat response for `{path}`")]
    InvalidSnowflake {
        /// Endpoint path the request targeted.
        path: String,
        /// The malformed identifier.
        value: String,
    },
}
