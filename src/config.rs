//! Configuration module
//!
//! Settings are read from `config.toml` in the platform configuration
//! directory. Every key is optional; missing keys take the built-in defaults.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while loading or saving settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the configuration file
    #[error("Failed to write config file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for our schema
    #[error("Invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    SerializationFailed(#[from] toml::ser::Error),
}

/// Top-level application settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub player: PlayerSettings,
    pub logging: LoggingSettings,
    pub credentials: CredentialSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Backend URL offered at login when none has been stored yet
    pub default_base_url: String,
    /// Per-request timeout for catalog calls
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            default_base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ServerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External player invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Executable to launch
    pub command: String,
    /// Arguments passed before the stream URL
    pub args: Vec<String>,
    /// Argument used to seek on start; `{seconds}` is replaced with the offset
    pub start_arg: String,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec!["--force-window=yes".to_string()],
            start_arg: "--start={seconds}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "stream_viewer=info".to_string(),
        }
    }
}

/// Where login credentials are kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// Operating system keyring, encrypted at rest
    #[default]
    Keyring,
    /// Plain JSON file readable only by the current user
    File,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub backend: CredentialBackend,
}

impl Settings {
    /// Loads settings from an explicit path.
    ///
    /// # Arguments
    ///
    /// * `path` - TOML file to read. A missing file is not an error.
    ///
    /// # Returns
    ///
    /// The parsed settings with defaults filled in for absent keys, or
    /// [`ConfigError::Invalid`] when the file does not match the schema.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Writes settings to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Path to the user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "stream-viewer")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_matches_defaults() {
        let reference: Settings = toml::from_str(include_str!("../config/default.toml")).unwrap();
        assert_eq!(reference, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [player]
            command = "vlc"
            "#,
        )
        .unwrap();

        assert_eq!(settings.player.command, "vlc");
        assert_eq!(settings.player.start_arg, "--start={seconds}");
        assert_eq!(settings.server.timeout_secs, 30);
        assert_eq!(settings.logging.filter, "stream_viewer=info");
        assert_eq!(settings.credentials.backend, CredentialBackend::Keyring);
    }

    #[test]
    fn test_credential_backend_names() {
        let settings: Settings = toml::from_str("[credentials]\nbackend = \"file\"\n").unwrap();
        assert_eq!(settings.credentials.backend, CredentialBackend::File);

        assert!(toml::from_str::<Settings>("[credentials]\nbackend = \"vault\"\n").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.default_base_url = "http://10.0.0.2:5000".to_string();
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\ntimeout_secs = \"soon\"\n").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
