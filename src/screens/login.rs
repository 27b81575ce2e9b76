use crate::catalog::{CatalogError, CatalogService, LoginRequest, UserInfo};
use crate::credentials::{CredentialStore, CredentialStoreError, Credentials};
use thiserror::Error;

/// Errors that can occur while logging in
#[derive(Debug, Error)]
pub enum LoginError {
    /// The backend refused the credentials
    #[error("Login rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] CredentialStoreError),
}

/// Logs in with `candidate` and stores it on success.
///
/// `catalog` must already be configured with the candidate credentials so
/// the login request itself carries them. On any failure the stored
/// credentials are left untouched.
pub fn login<S, C>(store: &S, candidate: &Credentials, catalog: &C) -> Result<UserInfo, LoginError>
where
    S: CredentialStore + ?Sized,
    C: CatalogService + ?Sized,
{
    let request = LoginRequest {
        username: candidate.username.clone(),
        password: candidate.password.clone(),
        url: candidate.provider_url.clone(),
    };

    tracing::info!(base_url = %candidate.base_url, username = %candidate.username, "logging in");
    let response = catalog.login(&request)?;

    if !response.success {
        let message = response
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "login failed".to_string());
        tracing::warn!(%message, "login rejected");
        return Err(LoginError::Rejected(message));
    }

    store.save(candidate)?;
    tracing::info!("login succeeded, credentials stored");
    Ok(response.user_info.unwrap_or_default())
}

/// Forgets the stored credentials.
pub fn logout<S: CredentialStore + ?Sized>(store: &S) -> Result<(), LoginError> {
    store.clear()?;
    tracing::info!("logged out");
    Ok(())
}
