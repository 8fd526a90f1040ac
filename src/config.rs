//! Application-level configuration: hunt tunables loaded from a JSON file.
//!
//! Secrets (bot token, OAuth client credentials) stay in the environment and
//! are read by the adapter configs; this file only carries the knobs that
//! vary per hunt.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::services::puzzle_service::HuntOptions;

/// Default location on disk where the binary looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PUZZLE_WARDEN_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Drive folder the hunt's spreadsheets live in.
    pub root_folder: String,
    /// Behavioral switches and category names for the orchestrator.
    pub hunt: HuntOptions,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        root_folder = %config.root_folder,
                        rounds = config.hunt.rounds_enabled,
                        party_counter = config.hunt.party_counter_enabled,
                        "loaded hunt configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            hunt: HuntOptions::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at
/// [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default = "default_root_folder")]
    root_folder: String,
    #[serde(default)]
    rounds_enabled: bool,
    #[serde(default)]
    party_counter_enabled: bool,
    #[serde(default)]
    start_party_size: i64,
    #[serde(default)]
    puzzles_category: Option<String>,
    #[serde(default)]
    solved_category: Option<String>,
    #[serde(default)]
    voice_category: Option<String>,
    #[serde(default)]
    protected_voice_prefixes: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = HuntOptions::default();
        Self {
            root_folder: raw.root_folder,
            hunt: HuntOptions {
                puzzles_category: raw.puzzles_category.unwrap_or(defaults.puzzles_category),
                solved_prefix: raw.solved_category.unwrap_or(defaults.solved_prefix),
                voice_category: raw.voice_category.unwrap_or(defaults.voice_category),
                rounds_enabled: raw.rounds_enabled,
                party_counter_enabled: raw.party_counter_enabled,
                start_party_size: raw.start_party_size,
                protected_voice_prefixes: raw
                    .protected_voice_prefixes
                    .unwrap_or(defaults.protected_voice_prefixes),
            },
        }
    }
}

fn default_root_folder() -> String {
    "Puzzle Hunt".to_string()
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_fills_gaps_with_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{"root_folder": "Hunt 2026", "rounds_enabled": true, "start_party_size": 12}"#,
        )
        .unwrap();
        let config: AppConfig = raw.into();

        assert_eq!(config.root_folder, "Hunt 2026");
        assert!(config.hunt.rounds_enabled);
        assert_eq!(config.hunt.start_party_size, 12);
        assert_eq!(config.hunt.puzzles_category, "Puzzles");
        assert_eq!(config.hunt.solved_prefix, "Solved");
        assert_eq!(
            config.hunt.protected_voice_prefixes,
            vec!["lobby".to_string(), "general".to_string()]
        );
    }

    #[test]
    fn empty_document_is_all_defaults() {
        let raw: RawConfig = serde_json::from_str("{}").unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.root_folder, "Puzzle Hunt");
        assert!(!config.hunt.rounds_enabled);
        assert!(!config.hunt.party_counter_enabled);
    }
}
