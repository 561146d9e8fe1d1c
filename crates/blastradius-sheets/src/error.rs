//! Error types for workbook loading.

use std::io;
use thiserror::Error;

/// The error type for workbook operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred while reading a workbook file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The plain-text workbook could not be parsed.
    #[error("YAML workbook error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The binary spreadsheet could not be parsed.
    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// A section name in a plain-text workbook is not a string.
    #[error("Invalid section name: {0}")]
    InvalidSection(String),

    /// A plain-text workbook cell is not a string.
    #[error(
        "Section '{section}' row {row} column {column}: expected text, found {found}; quote the cell to keep its exact value"
    )]
    NonTextCell {
        /// Section holding the cell
        section: String,
        /// 1-based row within the section
        row: usize,
        /// 1-based column
        column: usize,
        /// What the cell held instead
        found: String,
    },

    /// The file extension does not map to a known workbook format.
    #[error("Unsupported workbook format: {0}")]
    UnsupportedFormat(String),
}

/// A specialized Result type for workbook operations.
pub type Result<T> = std::result::Result<T, Error>;
