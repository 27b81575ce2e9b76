//! Credential storage module
//!
//! This module persists the backend URL and provider account across runs.
//! The default store encrypts them in the operating system's keyring
//! (Keychain, Credential Manager or the Secret Service). The file-backed
//! store keeps a JSON document in the system's standard data directory,
//! readable only by the current user.

use crate::config::CredentialBackend;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Header carrying the provider username on every backend request
pub const HEADER_STREAM_USER: &str = "X-Stream-User";
/// Header carrying the provider password on every backend request
pub const HEADER_STREAM_PASS: &str = "X-Stream-Pass";
/// Header carrying the upstream provider URL on every backend request
pub const HEADER_STREAM_URL: &str = "X-Stream-Url";

/// Errors that can occur during credential storage operations
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Failed to determine the data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to create or access the data directory
    #[error("Failed to create data directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read stored credentials
    #[error("Failed to read credentials file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write credentials
    #[error("Failed to write credentials file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Stored credentials are not valid JSON
    #[error("Failed to deserialize credentials file {path}: {source}")]
    DeserializationFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Failed to serialize credentials for storage
    #[error("Failed to serialize credentials: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// The platform keyring rejected the operation
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// The keyring secret is not a credentials document
    #[error("Failed to deserialize credentials from the keyring: {0}")]
    KeyringDeserializationFailed(serde_json::Error),
}

/// Keyring service name the credentials are filed under
pub const KEYRING_SERVICE: &str = "stream-viewer";
/// Keyring account name the credentials are filed under
pub const KEYRING_USER: &str = "credentials";

/// Connection settings for the backend and the upstream provider account.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Stream viewer backend, e.g. `http://192.168.0.10:5000`
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Upstream Xtream provider, used to build stream URLs
    pub provider_url: String,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        provider_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            provider_url: provider_url.into(),
        }
    }

    /// The `X-Stream-*` headers, present only when all three values are set.
    pub fn stream_headers(&self) -> Option<[(&'static str, &str); 3]> {
        if self.username.is_empty() || self.password.is_empty() || self.provider_url.is_empty() {
            return None;
        }
        Some([
            (HEADER_STREAM_USER, self.username.as_str()),
            (HEADER_STREAM_PASS, self.password.as_str()),
            (HEADER_STREAM_URL, self.provider_url.as_str()),
        ])
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("provider_url", &self.provider_url)
            .finish()
    }
}

/// Trait for key-value stores holding the session credentials.
pub trait CredentialStore {
    /// Returns the stored credentials, or `None` if nobody has logged in yet.
    fn load(&self) -> Result<Option<Credentials>, CredentialStoreError>;

    /// Replaces the stored credentials.
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError>;

    /// Forgets the stored credentials.
    fn clear(&self) -> Result<(), CredentialStoreError>;
}

/// Opens the store selected in the settings.
pub fn open_store(backend: CredentialBackend) -> Result<Box<dyn CredentialStore>, CredentialStoreError> {
    Ok(match backend {
        CredentialBackend::Keyring => Box::new(KeyringCredentialStore::open()?),
        CredentialBackend::File => Box::new(FileCredentialStore::open()?),
    })
}

/// Credentials encrypted at rest by the operating system's keyring.
///
/// The whole [`Credentials`] document is stored as one secret, so a login
/// replaces all four values at once.
pub struct KeyringCredentialStore {
    entry: keyring::Entry,
}

impl KeyringCredentialStore {
    /// Opens the keyring entry for this application.
    ///
    /// Nothing is read until [`CredentialStore::load`] is called, so opening
    /// succeeds even when no credentials are stored yet.
    ///
    /// # Returns
    ///
    /// The store, or [`CredentialStoreError::Keyring`] when the platform
    /// keyring is unavailable.
    pub fn open() -> Result<Self, CredentialStoreError> {
        Ok(Self {
            entry: keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?,
        })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialStoreError> {
        let secret = match self.entry.get_password() {
            Ok(secret) => secret,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&secret)
            .map(Some)
            .map_err(CredentialStoreError::KeyringDeserializationFailed)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        let secret = serde_json::to_string(credentials)?;
        self.entry.set_password(&secret)?;
        tracing::debug!(service = KEYRING_SERVICE, "credentials stored in keyring");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credentials persisted as JSON in the platform data directory.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Opens the store at its default location, creating the directory
    ///
    /// - Linux: ~/.local/share/stream-viewer/credentials.json
    /// - macOS: ~/Library/Application Support/stream-viewer/credentials.json
    /// - Windows: %APPDATA%\stream-viewer\data\credentials.json
    pub fn open() -> Result<Self, CredentialStoreError> {
        let proj_dirs =
            crate::config::project_dirs().ok_or(CredentialStoreError::DataDirectoryNotFound)?;
        let data_dir = proj_dirs.data_dir();

        fs::create_dir_all(data_dir).map_err(|e| CredentialStoreError::DirectoryCreationFailed {
            path: data_dir.to_path_buf(),
            source: e,
        })?;

        Ok(Self::at(data_dir.join("credentials.json")))
    }

    /// Uses an explicit file path.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the credentials document. The parent directory
    ///   must exist; the file itself is created on the first save.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let store = FileCredentialStore::at("/tmp/viewer/credentials.json");
    /// store.save(&credentials)?;
    /// ```
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| CredentialStoreError::ReadFailed {
                path: self.path.clone(),
                source: e,
            })?;

        let credentials = serde_json::from_str(&content).map_err(|e| {
            CredentialStoreError::DeserializationFailed {
                path: self.path.clone(),
                source: e,
            }
        })?;

        Ok(Some(credentials))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        let content = serde_json::to_string_pretty(credentials)?;

        // Written beside the target and renamed into place
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|e| CredentialStoreError::WriteFailed {
            path: temp_path.clone(),
            source: e,
        })?;
        restrict_permissions(&temp_path).map_err(|e| CredentialStoreError::WriteFailed {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| CredentialStoreError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), "credentials stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialStoreError::WriteFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// In-process store, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn with(credentials: Credentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialStoreError> {
        Ok(self.lock().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        *self.lock() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.lock() = None;
        Ok(())
    }
}

impl MemoryCredentialStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Credentials>> {
        // A poisoned lock still holds a complete value
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials::new("http://backend:5000", "alice", "s3cret", "http://provider.tv")
    }

    #[test]
    fn test_stream_headers_require_all_values() {
        let creds = sample();
        let headers = creds.stream_headers().unwrap();
        assert_eq!(headers[0], ("X-Stream-User", "alice"));
        assert_eq!(headers[1], ("X-Stream-Pass", "s3cret"));
        assert_eq!(headers[2], ("X-Stream-Url", "http://provider.tv"));

        let mut partial = sample();
        partial.provider_url.clear();
        assert!(partial.stream_headers().is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_file_store_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::at(dir.path().join("credentials.json"));

        assert_eq!(store.load().unwrap(), None);

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::at(dir.path().join("credentials.json"));
        store.save(&sample()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        let store = FileCredentialStore::at(path);
        assert!(matches!(
            store.load(),
            Err(CredentialStoreError::DeserializationFailed { .. })
        ));
    }

    fn mock_keyring_store() -> KeyringCredentialStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringCredentialStore::open().unwrap()
    }

    #[test]
    fn test_keyring_store_roundtrip_and_clear() {
        let store = mock_keyring_store();

        assert_eq!(store.load().unwrap(), None);

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));

        let mut updated = sample();
        updated.password = "rotated".to_string();
        store.save(&updated).unwrap();
        assert_eq!(store.load().unwrap(), Some(updated));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_keyring_store_reports_corruption() {
        let store = mock_keyring_store();
        store.entry.set_password("not json").unwrap();

        assert!(matches!(
            store.load(),
            Err(CredentialStoreError::KeyringDeserializationFailed(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.load().unwrap(), None);
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
