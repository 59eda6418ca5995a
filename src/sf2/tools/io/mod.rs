pub mod csv_input;
pub mod excel_read;
pub mod excel_write;
pub mod json_input;

use std::path::Path;

use crate::sf2::tools::error::{Result, ToolError};
use crate::sf2::tools::model::ReportSource;

/// Supported attendance input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

/// Guesses the input format from the file extension.
pub fn detect_format(path: &Path) -> Option<InputFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "json" => Some(InputFormat::Json),
        "csv" => Some(InputFormat::Csv),
        _ => None,
    }
}

/// Reads a report source in the given format, or the one implied by the
/// file extension.
pub fn read_source(path: &Path, format: Option<InputFormat>) -> Result<ReportSource> {
    let format = format.or_else(|| detect_format(path)).ok_or_else(|| {
        ToolError::UnsupportedInput(format!(
            "cannot determine the format of {}",
            path.display()
        ))
    })?;
    match format {
        InputFormat::Json => json_input::read_source(path),
        InputFormat::Csv => csv_input::read_source(path),
    }
}
