//! Stream Viewer - Browse and play Xtream catalogs from the terminal
//!
//! This library provides the catalog client for a stream viewer backend,
//! the content resolution core that reconciles watch state with catalog
//! entries, and the per-screen orchestration the binary is built on.

pub mod catalog;
pub mod config;
pub mod credentials;
pub mod navigation;
pub mod player;
pub mod resolution;
pub mod screens;
pub mod session;

// Re-export error types
pub use catalog::CatalogError;
pub use config::ConfigError;
pub use credentials::CredentialStoreError;
pub use navigation::RouteError;
pub use player::PlayerError;
pub use screens::login::LoginError;

// Re-export the types most callers need
pub use catalog::{
    CatalogService, Category, ContentEntry, ContentKind, Episode, HttpCatalogClient,
    NumericOrText, SeriesInfo, WatchRecord,
};
pub use config::{CredentialBackend, Settings};
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, KeyringCredentialStore};
pub use navigation::{PlayRequest, Route};
pub use player::{ExternalPlayer, PlaybackSession, Player};
pub use resolution::{ContentId, MediaKey, StreamUrls};

use thiserror::Error;

/// Main error type for Stream Viewer operations
#[derive(Debug, Error)]
pub enum StreamViewerError {
    /// Error talking to the catalog backend
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error loading or saving settings
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error accessing stored credentials
    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialStoreError),

    /// Error during login
    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    /// Error parsing a route
    #[error("Navigation error: {0}")]
    Route(#[from] RouteError),

    /// Error driving the player
    #[error("Player error: {0}")]
    Player(#[from] PlayerError),

    /// No credentials have been stored yet
    #[error("Not logged in. Run `stream-viewer login` first.")]
    NotLoggedIn,
}

/// Builds a catalog client from the stored credentials.
///
/// # Arguments
///
/// * `store` - Credential store written by a previous login
/// * `settings` - Supplies the per-request timeout
///
/// # Returns
///
/// A client carrying the stored credentials, or
/// [`StreamViewerError::NotLoggedIn`] when nothing is stored.
pub fn connect<S>(store: &S, settings: &Settings) -> Result<HttpCatalogClient, StreamViewerError>
where
    S: CredentialStore + ?Sized,
{
    let credentials = store.load()?.ok_or(StreamViewerError::NotLoggedIn)?;
    tracing::debug!(base_url = %credentials.base_url, "connecting to backend");
    Ok(HttpCatalogClient::new(
        credentials,
        settings.server.timeout(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credentials::MemoryCredentialStore;

    #[test]
    fn test_connect_requires_login() {
        let store = MemoryCredentialStore::default();
        assert!(matches!(
            connect(&store, &Settings::default()),
            Err(StreamViewerError::NotLoggedIn)
        ));
    }

    #[test]
    fn test_connect_uses_stored_credentials() {
        let creds = Credentials::new("http://backend:5000/", "alice", "pw", "http://p.tv");
        let store = MemoryCredentialStore::with(creds.clone());
        let client = connect(&store, &Settings::default()).unwrap();
        assert_eq!(client.credentials(), &creds);
    }
}
