//! Host configuration: where the preset API lives and where a local
//! database file goes.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5138";
pub const DATABASE_FILE: &str = "presets.db";

pub const ENV_API_BASE_URL: &str = "STRUDEL_API_BASE_URL";
pub const ENV_DB_PATH: &str = "STRUDEL_DB_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    /// Origin of the preset API, without the `/api/...` path.
    pub api_base_url: String,
    /// SQLite file used by the local store.
    pub database_path: PathBuf,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_path: default_database_path(),
        }
    }
}

impl CoreConfig {
    /// Defaults, overridden by `STRUDEL_API_BASE_URL` / `STRUDEL_DB_PATH`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(path) = get(ENV_DB_PATH) {
            self.database_path = PathBuf::from(path);
        }
        self
    }
}

/// `presets.db` in the platform data directory, or the working directory
/// when the platform has none.
pub fn default_database_path() -> PathBuf {
    ProjectDirs::from("net", "strudel-reactor", "strudel-reactor")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5138");
        assert!(config.database_path.ends_with(DATABASE_FILE));
    }

    #[test]
    fn overrides_apply_and_blank_values_are_ignored() {
        let config = CoreConfig::default().with_overrides(|key| match key {
            ENV_API_BASE_URL => Some("https://presets.example".into()),
            ENV_DB_PATH => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "https://presets.example");
        assert_eq!(config.database_path, default_database_path());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CoreConfig::from_json(r#"{"databasePath":"/tmp/p.db"}"#).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/p.db"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
