//! Row-level access to the named sections of a workbook.
//!
//! Importers only ever need to ask two questions of a spreadsheet: "is there a
//! section with this name?" and "give me its rows, one at a time". This crate
//! answers both behind the [`Workbook`] trait so the import pipeline never sees
//! a binary spreadsheet format.
//!
//! Three sources are provided:
//!
//! - [`MemoryWorkbook`]: sections built in code, mostly for tests
//! - [`yaml`]: a plain-text workbook where each section is a list of rows
//! - [`xlsx`] (feature `xlsx`, on by default): `.xlsx`, `.xls` and `.ods` files
//!
//! [`open_workbook`] picks the loader from the file extension.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod workbook;
#[cfg(feature = "xlsx")]
pub mod xlsx;
pub mod yaml;

pub use error::{Error, Result};
pub use memory::MemoryWorkbook;
pub use workbook::{Row, RowIter, Workbook};

use std::path::Path;

/// Load a workbook from disk, choosing the format from the file extension.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for unknown extensions (or for binary
/// spreadsheets when the `xlsx` feature is disabled), and the loader's error
/// when the file cannot be read or parsed.
pub fn open_workbook(path: impl AsRef<Path>) -> Result<MemoryWorkbook> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "yaml" | "yml" => yaml::load_yaml(path),
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xls" | "ods" => xlsx::load_xlsx(path),
        other => Err(Error::UnsupportedFormat(if other.is_empty() {
            path.display().to_string()
        } else {
            format!(".{other}")
        })),
    }
}
