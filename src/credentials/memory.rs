use super::CredentialStore;
use crate::error::Result;
use crate::models::{Credential, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-lifetime credential table.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<HashMap<UserId, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, user: &UserId) -> Result<Option<Credential>> {
        Ok(self.credentials.read().await.get(user).cloned())
    }

    async fn put(&self, user: &UserId, credential: Credential) -> Result<()> {
        self.credentials
            .write()
            .await
            .insert(user.clone(), credential);
        Ok(())
    }

    async fn delete(&self, user: &UserId) -> Result<()> {
        self.credentials.write().await.remove(user);
        Ok(())
    }
}
