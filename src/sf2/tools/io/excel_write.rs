use std::path::{Path, PathBuf};

use tracing::debug;
use umya_spreadsheet::Worksheet;

use crate::sf2::tools::error::{Result, ToolError};
use crate::sf2::tools::io::excel_read::read_template;
use crate::sf2::tools::layout::{CellValue, FilledDocument, GridCoordinate};

/// Materialises a laid-out report as a file.
pub trait DocumentWriter {
    fn write(&self, document: &FilledDocument, output: &Path) -> Result<()>;
}

/// Writes reports into a copy of a template workbook.
///
/// Every part starts from a fresh load of the template, so the sheets,
/// styles, merged ranges and column widths of the template survive and
/// only the cells named by the document change.
#[derive(Debug, Clone)]
pub struct TemplateWriter {
    template: PathBuf,
}

impl TemplateWriter {
    /// Checks the template at `path` can be loaded. Fails with
    /// [`MissingTemplate`](crate::ToolError::MissingTemplate) when it does
    /// not exist.
    pub fn open(path: &Path) -> Result<Self> {
        read_template(path)?;
        Ok(Self {
            template: path.to_path_buf(),
        })
    }
}

impl DocumentWriter for TemplateWriter {
    fn write(&self, document: &FilledDocument, output: &Path) -> Result<()> {
        let mut spreadsheet = read_template(&self.template)?;
        let worksheet = spreadsheet
            .get_sheet_mut(&0)
            .ok_or_else(|| ToolError::InvalidWorkbook("template has no worksheets".to_string()))?;

        let mut cleared = 0usize;
        for (coordinate, value) in document.cells() {
            if write_cell(worksheet, coordinate, value) {
                cleared += 1;
            }
        }

        debug!(
            document_cells = document.len(),
            cleared_cells = cleared,
            output = %output.display(),
            "saving workbook"
        );
        umya_spreadsheet::writer::xlsx::write(&spreadsheet, output)?;
        Ok(())
    }
}

/// Writes one document cell. Returns whether an existing template value
/// was cleared.
fn write_cell(worksheet: &mut Worksheet, coordinate: &GridCoordinate, value: &CellValue) -> bool {
    let position = (u32::from(coordinate.column), coordinate.row);
    match value {
        CellValue::Text(text) if !text.is_empty() => {
            worksheet.get_cell_mut(position).set_value_string(text.as_str());
        }
        CellValue::Number(number) => {
            worksheet.get_cell_mut(position).set_value_number(*number);
        }
        CellValue::Formula(source) => {
            worksheet
                .get_cell_mut(position)
                .set_formula(source.trim_start_matches('='));
        }
        // Empty text and Blank wipe the template value but keep its style.
        CellValue::Text(_) | CellValue::Blank => {
            if worksheet.get_cell(position).is_some() {
                worksheet.get_cell_mut(position).set_blank();
                return true;
            }
        }
    }
    false
}
