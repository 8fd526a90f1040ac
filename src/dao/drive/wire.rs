//! Serde models and query helpers for the Drive REST API.

use serde::{Deserialize, Serialize};

/// MIME type the store uses for folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
/// MIME type the store uses for spreadsheets.
pub const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Response body of `GET files?q=...`.
#[derive(Debug, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<FileResource>,
}

/// File metadata subset the bot cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Body for `POST files`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub name: String,
    pub mime_type: String,
    pub parents: Vec<String>,
}

/// Body for `PATCH files/{id}` marking a file as trashed.
#[derive(Debug, Serialize)]
pub struct TrashFileRequest {
    pub trashed: bool,
}

/// Build a search query matching non-trashed files of one MIME type with an
/// exact name, optionally constrained to a parent folder.
pub fn search_query(mime_type: &str, name: &str, parent: Option<&str>) -> String {
    let mut query = format!(
        "mimeType = '{mime_type}' and name = '{}' and trashed = false",
        escape_query_value(name)
    );
    if let Some(parent) = parent {
        query.push_str(&format!(" and '{parent}' in parents"));
    }
    query
}

/// Escape a value for inclusion in a single-quoted query literal.
///
/// Puzzle titles routinely contain apostrophes; without escaping they would
/// terminate the query string early.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
