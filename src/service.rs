use crate::credentials::CredentialManager;
use crate::error::Result;
use crate::google::SpreadsheetOperations;
use crate::models::{SheetData, SpreadsheetListing, UserId};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Last column requested when reading a sheet (ZZ, column 702).
const LAST_COLUMN: &str = "ZZ";

/// Lists a user's spreadsheets and reads values from individual sheets.
pub struct SheetsService {
    credentials: Arc<CredentialManager>,
    client: Arc<dyn SpreadsheetOperations>,
}

impl SheetsService {
    pub fn new(credentials: Arc<CredentialManager>, client: Arc<dyn SpreadsheetOperations>) -> Self {
        Self {
            credentials,
            client,
        }
    }

    /// List the user's spreadsheets with their sheets.
    ///
    /// A spreadsheet whose metadata can't be fetched is still listed, with a
    /// single placeholder sheet, so one bad file doesn't hide the others.
    #[instrument(name = "Listing spreadsheets", skip_all, fields(user = %user))]
    pub async fn list_spreadsheets(&self, user: &UserId) -> Result<Vec<SpreadsheetListing>> {
        let credential = self.credentials.require(user).await?;
        let files = self
            .client
            .list_spreadsheet_files(&credential.access_token)
            .await?;

        let mut listings = Vec::with_capacity(files.len());
        for file in files {
            let listing = match self
                .client
                .get_sheet_summaries(&credential.access_token, &file.id)
                .await
            {
                Ok(sheets) => SpreadsheetListing::resolved(file, sheets),
                Err(e) => {
                    warn!(
                        spreadsheet_id = %file.id,
                        error = %e,
                        "Error getting spreadsheet details, using placeholder sheet"
                    );
                    SpreadsheetListing::placeholder(file, e.to_string())
                }
            };
            listings.push(listing);
        }

        let placeholders = listings.iter().filter(|l| l.is_placeholder()).count();
        debug!(count = listings.len(), placeholders, "Listed spreadsheets");

        Ok(listings)
    }

    #[instrument(name = "Reading sheet", skip(self, user), fields(user = %user))]
    pub async fn get_sheet_data(
        &self,
        user: &UserId,
        spreadsheet_id: &str,
        sheet_name: &str,
    ) -> Result<SheetData> {
        let credential = self.credentials.require(user).await?;
        let values = self
            .client
            .get_values(
                &credential.access_token,
                spreadsheet_id,
                &sheet_range(sheet_name),
            )
            .await?;

        Ok(SheetData::from_rows(spreadsheet_id, sheet_name, values))
    }
}

/// A1 range covering every row of columns A through ZZ of `sheet_name`.
fn sheet_range(sheet_name: &str) -> String {
    format!("'{}'!A:{}", sheet_name.replace('\'', "''"), LAST_COLUMN)
}
