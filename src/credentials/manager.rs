use super::CredentialStore;
use crate::error::{AppError, Result};
use crate::google::OAuthProvider;
use crate::models::{Credential, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Hands out usable credentials, refreshing expired access tokens on read.
///
/// Every read-check-refresh-write sequence for a user runs under that user's
/// lock, so concurrent requests trigger at most one refresh and a logout can't
/// be undone by a refresh that was already in flight.
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    oauth: Arc<dyn OAuthProvider>,
    user_locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>, oauth: Arc<dyn OAuthProvider>) -> Self {
        Self {
            store,
            oauth,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn user_lock(&self, user: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Get the stored credential for `user`, refreshing it first if the access
    /// token has expired and a refresh token is available.
    ///
    /// Without a refresh token the stale credential is returned unchanged and
    /// the caller's next API call fails with an authorization error.
    #[instrument(name = "Loading credential", skip_all, fields(user = %user))]
    pub async fn load(&self, user: &UserId) -> Result<Option<Credential>> {
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;

        let Some(credential) = self.store.get(user).await? else {
            debug!("No stored credential");
            return Ok(None);
        };

        if !credential.is_expired() {
            return Ok(Some(credential));
        }

        if !credential.can_refresh() {
            warn!("Access token expired and no refresh token is available");
            return Ok(Some(credential));
        }

        debug!("Access token expired, refreshing...");
        let refreshed = self.oauth.refresh(&credential).await.inspect_err(|e| {
            warn!(error = %e, "Token refresh failed");
        })?;
        self.store.put(user, refreshed.clone()).await?;
        info!("Token refresh successful");

        Ok(Some(refreshed))
    }

    /// Like [`load`](Self::load), but a missing credential is an error.
    pub async fn require(&self, user: &UserId) -> Result<Credential> {
        self.load(user).await?.ok_or(AppError::Unauthenticated)
    }

    #[instrument(name = "Storing credential", skip_all, fields(user = %user))]
    pub async fn store(&self, user: &UserId, credential: Credential) -> Result<()> {
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;

        info!(
            has_refresh_token = credential.can_refresh(),
            "Credential stored"
        );
        self.store.put(user, credential).await
    }

    #[instrument(name = "Removing credential", skip_all, fields(user = %user))]
    pub async fn remove(&self, user: &UserId) -> Result<()> {
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;

        self.store.delete(user).await?;

        // Drop the lock entry unless another request already holds a handle to it
        let mut locks = self.user_locks.lock().await;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(user);
        }

        Ok(())
    }

    pub async fn is_authenticated(&self, user: &UserId) -> Result<bool> {
        Ok(self.store.get(user).await?.is_some())
    }
}
