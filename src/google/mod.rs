mod auth;
mod client;
#[cfg(test)]
pub(crate) mod mocks;

pub use auth::GoogleOAuth;
pub use client::GoogleClient;

use crate::error::{AppError, Result};
use crate::models::{Credential, DriveFile, SheetSummary};
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// Where to send the user to grant access, plus the anti-forgery state token.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationRequest {
    pub auth_url: String,
    pub state: String,
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn authorize_url(&self) -> Result<AuthorizationRequest>;

    async fn exchange_code(&self, code: &str) -> Result<Credential>;

    async fn refresh(&self, credential: &Credential) -> Result<Credential>;
}

#[async_trait]
pub trait SpreadsheetOperations: Send + Sync {
    async fn list_spreadsheet_files(&self, access_token: &str) -> Result<Vec<DriveFile>>;

    async fn get_sheet_summaries(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
    ) -> Result<Vec<SheetSummary>>;

    async fn get_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>>;
}

/// Bound a network call by `limit`, reporting `operation` on expiry.
pub(crate) async fn with_timeout<F, T>(limit: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AppError::Timeout(operation.to_string()))?
}
