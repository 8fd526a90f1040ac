//! Port over the spreadsheet document store, plus its backends.

/// Access-token lifecycle and credential capabilities.
pub mod auth;
mod client;
mod config;
mod error;
/// In-memory document store used by tests and dry runs.
pub mod memory;
mod wire;

use futures::future::BoxFuture;

pub use self::client::DriveClient;
pub use self::config::DriveConfig;
pub use self::error::{DriveError, DriveResult};

/// Abstraction over the spreadsheet store.
///
/// Every operation is idempotent against re-runs: creation searches before
/// creating, and the move/trash operations act on all matches.
pub trait DocumentStore: Send + Sync {
    /// Return the browse link of the spreadsheet with this exact title in the
    /// root folder, creating it when absent.
    fn find_or_create_spreadsheet(&self, title: &str) -> BoxFuture<'static, DriveResult<String>>;
    /// Re-parent all non-trashed spreadsheets with this title from the root
    /// folder into the Solved folder.
    fn move_spreadsheet_to_solved(&self, title: &str) -> BoxFuture<'static, DriveResult<()>>;
    /// Mark all spreadsheets with this title as trashed, across both the root
    /// and Solved folders. Never hard-deletes.
    fn trash_spreadsheet(&self, title: &str) -> BoxFuture<'static, DriveResult<()>>;
}
