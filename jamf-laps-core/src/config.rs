//! Persisted client configuration.
//!
//! Non-secret settings live in a TOML file in the platform configuration
//! directory (`~/.config/jamf-laps/config.toml` on Linux,
//! `~/Library/Application Support/com.jamf.jamf-laps/config.toml` on macOS).
//! Secrets never go here; see [`crate::store::CredentialStore`].

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::model::AuthMode;
use crate::store::StoreBackend;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`AppConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Configuration directory not available.
    #[error("configuration directory not available")]
    ConfigDirUnavailable,
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the Jamf Pro server, e.g. `https://example.jamfcloud.com`.
    pub server_url: String,

    /// Username or API client ID.
    pub username: String,

    /// Credential scheme used to obtain bearer tokens.
    pub auth_mode: AuthMode,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Where the password or client secret is saved.
    pub credential_backend: StoreBackend,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            username: String::new(),
            auth_mode: AuthMode::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            credential_backend: StoreBackend::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the default location of the configuration file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("com", "jamf", "jamf-laps")
            .ok_or(ConfigError::ConfigDirUnavailable)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location, or defaults if there is no file yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Load from a specific path, or defaults if the file doesn't exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save to a specific path, creating parent directories as needed.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Wrote config to {:?}", path);
        Ok(())
    }

    /// Whether a server URL has been set.
    pub fn is_configured(&self) -> bool {
        !self.server_url.trim().is_empty()
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load_from_path(&temp.path().join("config.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
        assert!(!config.is_configured());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = AppConfig {
            server_url: "https://example.com".to_string(),
            username: "api-client".to_string(),
            auth_mode: AuthMode::ClientCredentials,
            request_timeout_secs: 10,
            credential_backend: StoreBackend::Memory,
            log_level: "debug".to_string(),
        };
        config.save_to_path(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains(r#"auth_mode = "client-credentials""#));
        assert!(contents.contains(r#"credential_backend = "memory""#));

        let loaded = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.is_configured());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "server_url = \"https://example.com\"\n").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.server_url, "https://example.com");
        assert_eq!(config.auth_mode, AuthMode::Basic);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.credential_backend, StoreBackend::Keyring);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "auth_mode = \"kerberos\"\n").unwrap();

        let result = AppConfig::load_from_path(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_whitespace_url_is_not_configured() {
        let config = AppConfig {
            server_url: "   ".to_string(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());
    }
}
