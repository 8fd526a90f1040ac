//! Canonical identifier policy for puzzle titles and round names.

use thiserror::Error;

/// Error returned when nothing is left of a title after sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("puzzle title is empty after removing quote and hash characters")]
pub struct EmptyTitle;

/// Strip quote and hash characters and surrounding whitespace from a raw
/// puzzle title.
///
/// The result doubles as channel name, channel topic, and spreadsheet title,
/// so an empty result is rejected rather than silently ignored.
pub fn sanitize_title(raw: &str) -> Result<String, EmptyTitle> {
    let title: String = raw
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '#'))
        .collect();
    let title = title.trim().to_string();
    if title.is_empty() { Err(EmptyTitle) } else { Ok(title) }
}

/// Project a round name onto its matching key: lowercased, alphanumeric only.
///
/// Two names with the same key count as one round. This tolerates punctuation
/// and emoji variation in round titles; the resulting collision potential is
/// accepted and guarded at round creation instead.
pub fn normalize_round_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Case-insensitive name-prefix check used for category matching.
pub fn has_name_prefix(name: &str, prefix: &str) -> bool {
    name.to_lowercase().starts_with(&prefix.to_lowercase())
}
