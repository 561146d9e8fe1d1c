//! Binary spreadsheet loading via calamine.
//!
//! Every worksheet becomes a section named after the sheet. Cells keep their
//! column position: a sheet whose used range starts at column `C` yields rows
//! with two leading empty cells, so `Row::field(3)` is still column `C`.
//!
//! Rows do not keep their position. Sections start at the first row of the
//! used range, so blank rows above the data are dropped and the first non-blank
//! row is the one importers treat as the header.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::Result;
use crate::memory::{MemoryWorkbook, SectionRows};

/// Load every worksheet of an `.xlsx`, `.xlsm`, `.xls` or `.ods` file.
///
/// # Errors
///
/// Returns [`crate::Error::Spreadsheet`] if the file cannot be opened or a
/// worksheet cannot be read.
pub fn load_xlsx(path: impl AsRef<Path>) -> Result<MemoryWorkbook> {
    let path = path.as_ref();
    let mut sheets = open_workbook_auto(path)?;
    let mut workbook = MemoryWorkbook::new();

    for name in sheets.sheet_names() {
        let range = sheets.worksheet_range(&name)?;
        let rows = range_to_rows(&range);
        debug!(sheet = %name, rows = rows.len(), "Read worksheet");
        workbook.add_section(name, rows);
    }

    Ok(workbook)
}

fn range_to_rows(range: &Range<Data>) -> SectionRows {
    let leading = range
        .start()
        .map_or(0, |(_, column)| usize::try_from(column).unwrap_or(0));

    range
        .rows()
        .map(|cells| {
            std::iter::repeat_n(None, leading)
                .chain(cells.iter().map(cell_text))
                .collect()
        })
        .collect()
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => Some(other.to_string()),
    }
}
