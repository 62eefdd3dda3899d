//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the server URL, the last used username, and an optional
//! download directory override.
//!
//! Configuration is stored at `~/.config/depot-tui/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "depot-tui";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default server address when nothing is configured.
/// The Depot service listens here when run locally.
const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub server_url: Option<String>,
    pub last_username: Option<String>,
    pub download_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Effective server URL: DEPOT_SERVER_URL, then the config file, then
    /// the local default.
    pub fn base_url(&self) -> String {
        std::env::var("DEPOT_SERVER_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    /// Directory downloaded files are saved to.
    /// Falls back to the platform download directory, then the current dir.
    pub fn downloads_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            server_url: Some("http://depot.example:9000".to_string()),
            last_username: Some("alice".to_string()),
            download_dir: Some(PathBuf::from("/tmp/downloads")),
        };

        let json = serde_json::to_string(&config).expect("serialize config");
        let parsed: Config = serde_json::from_str(&json).expect("parse config");

        assert_eq!(parsed.server_url.as_deref(), Some("http://depot.example:9000"));
        assert_eq!(parsed.last_username.as_deref(), Some("alice"));
        assert_eq!(parsed.download_dir, Some(PathBuf::from("/tmp/downloads")));
    }

    #[test]
    fn test_config_defaults_parse() {
        // Older config files may miss newer fields entirely
        let parsed: Config = serde_json::from_str("{}").expect("parse empty config");
        assert!(parsed.server_url.is_none());
        assert!(parsed.last_username.is_none());
        assert!(parsed.download_dir.is_none());
    }

    #[test]
    fn test_explicit_download_dir_wins() {
        let config = Config {
            download_dir: Some(PathBuf::from("/data/depot")),
            ..Default::default()
        };
        assert_eq!(config.downloads_dir(), PathBuf::from("/data/depot"));
    }
}
