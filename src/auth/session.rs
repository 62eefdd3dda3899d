// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// A stored login session.
///
/// The token is opaque to the client and carries no expiry information.
/// A request failing with 401 is the only signal that it has gone stale;
/// the next successful login overwrites it in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read session file")?;
            let data: SessionData = serde_json::from_str(&contents)
                .context("Failed to parse session file")?;
            self.data = Some(data);
            return Ok(true);
        }
        Ok(false)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Clear session data
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Update session with new data, replacing any previous session
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Get the logged-in username if a session exists
    pub fn username(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.username.as_str())
    }

    /// Check if a session is present
    pub fn is_valid(&self) -> bool {
        self.data.is_some()
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data(token: &str) -> SessionData {
        SessionData {
            token: token.to_string(),
            username: "alice".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut session = Session::new(dir.path().to_path_buf());
        session.update(sample_data("tok-1"));
        session.save().expect("save session");

        let mut reloaded = Session::new(dir.path().to_path_buf());
        assert!(reloaded.load().expect("load session"));
        assert_eq!(reloaded.token(), Some("tok-1"));
        assert_eq!(reloaded.username(), Some("alice"));
        assert!(reloaded.is_valid());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut session = Session::new(dir.path().to_path_buf());
        assert!(!session.load().expect("load session"));
        assert!(!session.is_valid());
        assert!(session.token().is_none());
    }

    #[test]
    fn test_update_overwrites_previous_token() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut session = Session::new(dir.path().to_path_buf());
        session.update(sample_data("tok-1"));
        session.save().expect("save session");

        session.update(sample_data("tok-2"));
        session.save().expect("save session");

        let mut reloaded = Session::new(dir.path().to_path_buf());
        reloaded.load().expect("load session");
        assert_eq!(reloaded.token(), Some("tok-2"));
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut session = Session::new(dir.path().to_path_buf());
        session.update(sample_data("tok-1"));
        session.save().expect("save session");
        session.clear().expect("clear session");

        let mut reloaded = Session::new(dir.path().to_path_buf());
        assert!(!reloaded.load().expect("load session"));
    }
}
