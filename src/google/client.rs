use super::{SpreadsheetOperations, with_timeout};
use crate::error::{AppError, Result};
use crate::models::{DriveFile, SheetSummary};
use async_trait::async_trait;
use google_drive3::DriveHub;
use google_drive3::api::Scope as DriveScope;
use google_sheets4::Sheets;
use google_sheets4::api::{Scope as SheetsScope, Sheet};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

const SPREADSHEET_QUERY: &str = "mimeType='application/vnd.google-apps.spreadsheet'";
const SPREADSHEET_PAGE_SIZE: i32 = 50;
const LIST_FIELDS: &str = "nextPageToken, files(id, name)";

const UNTITLED_SHEET: &str = "Untitled";

const SHEETS_READ_SCOPE: SheetsScope = SheetsScope::SpreadsheetReadonly;

type Connector = HttpsConnector<HttpConnector>;

/// Drive and Sheets access on behalf of whoever owns the supplied access token.
pub struct GoogleClient {
    connector: Connector,
    timeout: Duration,
}

impl GoogleClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();

        Ok(Self { connector, timeout })
    }

    fn sheets(&self, access_token: &str) -> Sheets<Connector> {
        let client = Client::builder(TokioExecutor::new()).build(self.connector.clone());
        Sheets::new(client, access_token.to_string())
    }

    fn drive(&self, access_token: &str) -> DriveHub<Connector> {
        let client = Client::builder(TokioExecutor::new()).build(self.connector.clone());
        DriveHub::new(client, access_token.to_string())
    }
}

#[async_trait]
impl SpreadsheetOperations for GoogleClient {
    #[instrument(name = "Listing spreadsheet files", skip_all)]
    async fn list_spreadsheet_files(&self, access_token: &str) -> Result<Vec<DriveFile>> {
        let drive = self.drive(access_token);

        let (_, file_list) = with_timeout(self.timeout, "spreadsheet listing", async {
            drive
                .files()
                .list()
                .q(SPREADSHEET_QUERY)
                .page_size(SPREADSHEET_PAGE_SIZE)
                .param("fields", LIST_FIELDS)
                .add_scope(DriveScope::Readonly)
                .doit()
                .await
                .map_err(|e| AppError::Upstream(format!("Error fetching spreadsheets: {}", e)))
        })
        .await?;

        let files: Vec<DriveFile> = file_list
            .files
            .unwrap_or_default()
            .into_iter()
            .filter_map(|file| {
                Some(DriveFile {
                    id: file.id?,
                    name: file.name.unwrap_or_default(),
                })
            })
            .collect();
        debug!(count = files.len(), "Found spreadsheet files");

        Ok(files)
    }

    #[instrument(name = "Fetching spreadsheet metadata", skip(self, access_token))]
    async fn get_sheet_summaries(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
    ) -> Result<Vec<SheetSummary>> {
        let sheets = self.sheets(access_token);

        let (_, spreadsheet) = with_timeout(self.timeout, "spreadsheet metadata", async {
            sheets
                .spreadsheets()
                .get(spreadsheet_id)
                .include_grid_data(false)
                .add_scope(SHEETS_READ_SCOPE)
                .doit()
                .await
                .map_err(|e| {
                    AppError::Upstream(format!(
                        "Failed to get spreadsheet '{}': {}",
                        spreadsheet_id, e
                    ))
                })
        })
        .await?;

        Ok(spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .map(sheet_summary)
            .collect())
    }

    #[instrument(name = "Fetching sheet values", skip(self, access_token))]
    async fn get_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>> {
        let sheets = self.sheets(access_token);

        let (_, response) = with_timeout(self.timeout, "sheet values", async {
            sheets
                .spreadsheets()
                .values_get(spreadsheet_id, range)
                .major_dimension("ROWS")
                .add_scope(SHEETS_READ_SCOPE)
                .doit()
                .await
                .map_err(|e| AppError::Upstream(format!("Error fetching sheet data: {}", e)))
        })
        .await?;

        // Values are Option<Vec<Vec<serde_json::Value>>>
        Ok(response
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

fn sheet_summary(sheet: Sheet) -> SheetSummary {
    let properties = sheet.properties.unwrap_or_default();

    SheetSummary {
        title: properties
            .title
            .unwrap_or_else(|| UNTITLED_SHEET.to_string()),
        sheet_id: properties.sheet_id.unwrap_or(0),
        index: properties.index.unwrap_or(0),
    }
}

/// Render a cell as text without any type coercion.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
