// Credential cache: a single JSON file in the user's home directory
// holding the bearer token and the email it was issued for. A missing
// or corrupt file is treated as "not logged in", never as an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".markpre_config.json";

/// Persisted session state. Field names match what the service's other
/// clients write, so the file is shared between them.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Config {
    /// The saved token, if it is usable. Blank tokens count as absent.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// `~/.markpre_config.json`, falling back to the current directory when
/// no home directory can be determined.
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

pub fn load() -> Config {
    load_from(&config_path())
}

pub fn load_from(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            debug!(path = %path.display(), %err, "ignoring corrupt config");
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}

pub fn save(config: &Config) -> Result<()> {
    save_to(config, &config_path())
}

pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    let raw = serde_json::to_string_pretty(config).context("serializing config")?;
    fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Remove the cached credential. Returns whether a session existed.
pub fn clear() -> Result<bool> {
    clear_at(&config_path())
}

pub fn clear_at(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = Config {
            access_token: Some("tok-123".to_string()),
            email: Some("user@example.com".to_string()),
        };
        save_to(&config, &path).unwrap();
        let loaded = load_from(&path);
        assert_eq!(loaded.token(), Some("tok-123"));
        assert_eq!(loaded.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn saved_file_uses_shared_field_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = Config {
            access_token: Some("tok".to_string()),
            email: None,
        };
        save_to(&config, &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("accessToken"));
        assert!(!raw.contains("email"));
    }

    #[test]
    fn missing_or_corrupt_file_means_logged_out() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(load_from(&missing).token().is_none());

        let corrupt = dir.path().join("bad.json");
        std::fs::write(&corrupt, "{not json").unwrap();
        assert!(load_from(&corrupt).token().is_none());
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let config = Config {
            access_token: Some("   ".to_string()),
            email: None,
        };
        assert!(config.token().is_none());
    }

    #[test]
    fn clear_reports_whether_a_session_existed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(!clear_at(&path).unwrap());
        std::fs::write(&path, "{}").unwrap();
        assert!(clear_at(&path).unwrap());
        assert!(!path.exists());
    }
}
