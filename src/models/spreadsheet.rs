use serde::{Deserialize, Serialize};

const PLACEHOLDER_SHEET_TITLE: &str = "Sheet1";

/// A spreadsheet file as returned by the file index.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub title: String,
    #[serde(rename = "sheetId")]
    pub sheet_id: i32,
    pub index: i32,
}

impl SheetSummary {
    /// Stand-in used when a spreadsheet's metadata can't be fetched.
    pub fn placeholder() -> Self {
        Self {
            title: PLACEHOLDER_SHEET_TITLE.to_string(),
            sheet_id: 0,
            index: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetInfo {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheets: Vec<SheetSummary>,
}

/// Outcome of enriching one listed file with its sheet metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum SpreadsheetListing {
    Resolved(SpreadsheetInfo),
    Placeholder {
        info: SpreadsheetInfo,
        reason: String,
    },
}

impl SpreadsheetListing {
    pub fn resolved(file: DriveFile, sheets: Vec<SheetSummary>) -> Self {
        Self::Resolved(SpreadsheetInfo {
            spreadsheet_id: file.id,
            title: file.name,
            sheets,
        })
    }

    pub fn placeholder(file: DriveFile, reason: impl Into<String>) -> Self {
        Self::Placeholder {
            info: SpreadsheetInfo {
                spreadsheet_id: file.id,
                title: file.name,
                sheets: vec![SheetSummary::placeholder()],
            },
            reason: reason.into(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }

    pub fn into_info(self) -> SpreadsheetInfo {
        match self {
            Self::Resolved(info) | Self::Placeholder { info, .. } => info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(id: &str) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: format!("Spreadsheet {id}"),
        }
    }

    #[test]
    fn test_placeholder_has_single_default_sheet() {
        let listing = SpreadsheetListing::placeholder(file("x"), "403 Forbidden");
        assert!(listing.is_placeholder());

        let info = listing.into_info();
        assert_eq!(info.spreadsheet_id, "x");
        assert_eq!(info.sheets, vec![SheetSummary::placeholder()]);
    }

    #[test]
    fn test_json_shape() {
        let info = SpreadsheetListing::resolved(
            file("y"),
            vec![SheetSummary {
                title: "Data".to_string(),
                sheet_id: 1234,
                index: 1,
            }],
        )
        .into_info();

        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "spreadsheet_id": "y",
                "title": "Spreadsheet y",
                "sheets": [{"title": "Data", "sheetId": 1234, "index": 1}],
            })
        );
    }
}
