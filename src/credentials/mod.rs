mod manager;
mod memory;

pub use manager::CredentialManager;
pub use memory::MemoryCredentialStore;

use crate::error::Result;
use crate::models::{Credential, UserId};
use async_trait::async_trait;

/// Keyed storage for per-user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user: &UserId) -> Result<Option<Credential>>;

    /// Store a credential, replacing any existing one for `user`.
    async fn put(&self, user: &UserId, credential: Credential) -> Result<()>;

    /// Remove the credential for `user`. Removing an absent credential is not an error.
    async fn delete(&self, user: &UserId) -> Result<()>;
}
