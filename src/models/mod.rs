pub mod credential;
pub mod sheet_data;
pub mod spreadsheet;

pub use credential::{Credential, UserId};
pub use sheet_data::SheetData;
pub use spreadsheet::{DriveFile, SheetSummary, SpreadsheetInfo, SpreadsheetListing};
