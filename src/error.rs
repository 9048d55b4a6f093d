use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads sweep exports, transforms them, or writes the merged workbook.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when the user provides a directory that does not exist.
    #[error("input directory not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a file name does not follow the `<series> <order>` convention.
    #[error("cannot order file '{file_name}': {reason}")]
    InvalidFileName { file_name: String, reason: String },

    /// Raised when the metadata block of an export is shorter than expected.
    #[error("malformed header in '{file_name}': {reason}")]
    MalformedHeader { file_name: String, reason: String },

    /// Raised when the frequency field is neither `0.00` nor a number.
    #[error("invalid frequency value '{0}'")]
    InvalidFrequency(String),

    /// Raised when a column referenced unconditionally is absent.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Raised when a value that must be numeric holds text.
    #[error("invalid numeric value '{value}' in column {column}")]
    InvalidNumber { column: String, value: String },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
