use std::path::Path;

use tracing::debug;
use umya_spreadsheet::Spreadsheet;

use crate::sf2::tools::error::{Result, ToolError};

/// Loads the template workbook at `path` with its sheets, styles and merged
/// ranges intact. Reports are written onto the first worksheet.
pub fn read_template(path: &Path) -> Result<Spreadsheet> {
    if !path.is_file() {
        return Err(ToolError::MissingTemplate(path.to_path_buf()));
    }

    let spreadsheet = umya_spreadsheet::reader::xlsx::read(path)?;
    let sheet = spreadsheet
        .get_sheet(&0)
        .ok_or_else(|| ToolError::InvalidWorkbook("template has no worksheets".to_string()))?;

    debug!(
        sheet = %sheet.get_name(),
        sheets = spreadsheet.get_sheet_collection().len(),
        "template loaded"
    );
    Ok(spreadsheet)
}
