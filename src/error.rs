use thiserror::Error;

use crate::dao::{chat::ChatError, drive::DriveError};

/// Result alias for hunt service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input was rejected before any external call was made.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The operation conflicts with the current state of the guild.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The solved category cannot accept another channel.
    #[error("solved category `{category}` is full")]
    Capacity {
        /// Name of the category that hit the channel ceiling.
        category: String,
        /// Mention string for the admin role, when the guild has one.
        mention: Option<String>,
    },
    /// A chat platform call failed after validation passed.
    #[error("chat platform request failed")]
    Chat(#[from] ChatError),
    /// A document store call failed after validation passed.
    #[error("document store request failed")]
    Drive(#[from] DriveError),
}
