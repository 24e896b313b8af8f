use serde::{Deserialize, Serialize};

/// Values of one sheet, split into a header row and body rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub headers: Vec<String>,
    #[serde(rename = "data")]
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    /// Treat the first row as headers and the rest as data. Rows are passed
    /// through as-is: no padding to the header width.
    pub fn from_rows(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        values: Vec<Vec<String>>,
    ) -> Self {
        let mut rows = values.into_iter();
        let headers = rows.next().unwrap_or_default();

        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            headers,
            rows: rows.collect(),
        }
    }
}
