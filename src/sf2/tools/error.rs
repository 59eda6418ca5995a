use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool ingests attendance data, lays out a report, or writes it to disk.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the CSV reader cannot tokenise the input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up while loading or saving a workbook.
    #[error("Excel error: {0}")]
    Excel(#[from] umya_spreadsheet::XlsxError),

    /// Raised when the school year or month cannot be resolved to a period.
    #[error("invalid report period: {0}")]
    InvalidPeriod(String),

    /// Raised when a date string is not a valid `YYYY-MM-DD` date.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Raised when the report template workbook is not available.
    #[error("template not found: {0}")]
    MissingTemplate(PathBuf),

    /// Raised when the input document lacks required keys or carries
    /// values of the wrong shape.
    #[error("schema validation failed: {0}")]
    SchemaValidation(String),

    /// Raised when a roster does not fit the template and the caller asked
    /// for overflow to be fatal.
    #[error(
        "student limit exceeded ({male} M / {female} F); the template holds at most {capacity} \
         per gender, use --overflow split to write multiple parts"
    )]
    CapacityExceeded {
        male: usize,
        female: usize,
        capacity: usize,
    },

    /// Raised when a template does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a layout coordinate cannot be parsed or is out of range.
    #[error("invalid cell coordinate '{0}'")]
    InvalidCoordinate(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the input format cannot be determined or is unsupported.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
