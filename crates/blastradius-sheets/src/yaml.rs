//! Plain-text workbooks.
//!
//! A YAML workbook is a mapping from section name to a list of rows, each row a
//! list of scalar cells:
//!
//! ```yaml
//! sections:
//!   AirlineEdgeRelateAirlineDCSV:
//!     - [Datacenter, Server]
//!     - [DC1, Server1]
//!     - [DC2, ~]
//! ```
//!
//! Cells must be strings; `~`/`null` is an empty cell. An unquoted number or
//! boolean is rejected rather than converted, since YAML has already resolved
//! it (`1.10` to `1.1`, `0x1F` to `31`) and its original text is lost. Quote
//! such names: `'1.10'`. Sections keep the order they appear in the file.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::{MemoryWorkbook, SectionRows};

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    sections: serde_yaml::Mapping,
}

/// Text of one cell, or the error for a cell that is not a string.
fn cell_text(value: Value, section: &str, row: usize, column: usize) -> Result<Option<String>> {
    let found = match value {
        Value::Null => return Ok(None),
        Value::String(text) => return Ok(Some(text)),
        Value::Number(number) => format!("number {number}"),
        Value::Bool(flag) => format!("boolean {flag}"),
        Value::Sequence(_) => "list".to_string(),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    };
    Err(Error::NonTextCell {
        section: section.to_string(),
        row,
        column,
        found,
    })
}

/// Load a YAML workbook from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Yaml`] if it
/// is not a valid workbook document.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<MemoryWorkbook> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let workbook = from_yaml_str(&text)?;
    debug!(path = %path.display(), sections = workbook.len(), "Loaded YAML workbook");
    Ok(workbook)
}

/// Parse a YAML workbook from a string.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if the text is not a valid workbook document,
/// [`Error::InvalidSection`] if a section name is not a string, or
/// [`Error::NonTextCell`] for an unquoted number, boolean or nested value.
pub fn from_yaml_str(text: &str) -> Result<MemoryWorkbook> {
    let document: Document = serde_yaml::from_str(text)?;
    let mut workbook = MemoryWorkbook::new();

    for (key, value) in document.sections {
        let Value::String(name) = key else {
            return Err(Error::InvalidSection(format!("{key:?}")));
        };
        let rows: Vec<Vec<Value>> = if value.is_null() {
            Vec::new()
        } else {
            serde_yaml::from_value(value)?
        };

        let mut section = SectionRows::with_capacity(rows.len());
        for (row_index, row) in rows.into_iter().enumerate() {
            let cells = row
                .into_iter()
                .enumerate()
                .map(|(column_index, cell)| cell_text(cell, &name, row_index + 1, column_index + 1))
                .collect::<Result<Vec<_>>>()?;
            section.push(cells);
        }
        workbook.add_section(name, section);
    }

    Ok(workbook)
}
