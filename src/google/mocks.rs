use super::{AuthorizationRequest, OAuthProvider, SpreadsheetOperations};
use crate::error::{AppError, Result};
use crate::models::credential::test_helpers::mock_credential;
use crate::models::{Credential, DriveFile, SheetSummary};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) const VALID_CODE: &str = "valid-code";

#[derive(Clone, Default)]
pub(crate) struct MockOAuthProvider {
    pub unconfigured: bool,
    pub fail_refresh: bool,
    pub refresh_delay: Option<std::time::Duration>,
    pub refresh_calls: Arc<Mutex<u32>>,
}

impl MockOAuthProvider {
    pub(crate) fn refresh_count(&self) -> u32 {
        *self.refresh_calls.lock().unwrap()
    }
}

#[async_trait]
impl OAuthProvider for MockOAuthProvider {
    fn authorize_url(&self) -> Result<AuthorizationRequest> {
        if self.unconfigured {
            return Err(AppError::Config("client identity not configured".to_string()));
        }
        Ok(AuthorizationRequest {
            auth_url: "https://accounts.google.com/o/oauth2/auth?state=mock-state".to_string(),
            state: "mock-state".to_string(),
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential> {
        if code != VALID_CODE {
            return Err(AppError::Auth(
                "Failed to exchange code: invalid_grant: Malformed auth code.".to_string(),
            ));
        }
        Ok(mock_credential(
            "access-from-code",
            Some(Utc::now() + Duration::hours(1)),
        ))
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let count = {
            let mut calls = self.refresh_calls.lock().unwrap();
            *calls += 1;
            *calls
        };

        if let Some(delay) = self.refresh_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_refresh {
            return Err(AppError::Auth(
                "Failed to refresh token: invalid_grant".to_string(),
            ));
        }

        Ok(Credential {
            access_token: format!("refreshed-{count}"),
            expiry: Some(Utc::now() + Duration::hours(1)),
            ..credential.clone()
        })
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockSpreadsheetClient {
    pub files: Vec<DriveFile>,
    /// Sheet metadata per spreadsheet id; ids missing here fail the metadata call.
    pub sheets: HashMap<String, Vec<SheetSummary>>,
    pub values: Vec<Vec<String>>,
    pub list_error: Option<String>,
    pub values_error: Option<String>,
    pub seen_tokens: Arc<Mutex<Vec<String>>>,
    pub requested_ranges: Arc<Mutex<Vec<String>>>,
}

impl MockSpreadsheetClient {
    fn record_token(&self, access_token: &str) {
        self.seen_tokens
            .lock()
            .unwrap()
            .push(access_token.to_string());
    }
}

#[async_trait]
impl SpreadsheetOperations for MockSpreadsheetClient {
    async fn list_spreadsheet_files(&self, access_token: &str) -> Result<Vec<DriveFile>> {
        self.record_token(access_token);
        match &self.list_error {
            Some(message) => Err(AppError::Upstream(message.clone())),
            None => Ok(self.files.clone()),
        }
    }

    async fn get_sheet_summaries(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
    ) -> Result<Vec<SheetSummary>> {
        self.record_token(access_token);
        self.sheets.get(spreadsheet_id).cloned().ok_or_else(|| {
            AppError::Upstream(format!("Failed to get spreadsheet '{}'", spreadsheet_id))
        })
    }

    async fn get_values(
        &self,
        access_token: &str,
        _spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>> {
        self.record_token(access_token);
        self.requested_ranges
            .lock()
            .unwrap()
            .push(range.to_string());
        match &self.values_error {
            Some(message) => Err(AppError::Upstream(message.clone())),
            None => Ok(self.values.clone()),
        }
    }
}

pub(crate) fn drive_file(id: &str) -> DriveFile {
    DriveFile {
        id: id.to_string(),
        name: format!("Spreadsheet {id}"),
    }
}

pub(crate) fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}
