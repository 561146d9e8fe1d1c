//! The row-iteration interface importers consume.

/// A single worksheet row.
///
/// Cells are addressed by 1-based column index, matching how spreadsheet users
/// count columns (`A` = 1). A cell that is absent or has no value reads as
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 1-based position of this row within its section.
    number: usize,
    cells: Vec<Option<String>>,
}

impl Row {
    /// Create a row from its position and cell values.
    #[must_use]
    pub fn new(number: usize, cells: Vec<Option<String>>) -> Self {
        Self { number, cells }
    }

    /// Returns the 1-based row number within the section.
    ///
    /// The header row is number 1.
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns the raw value of the cell at `column` (1-based).
    ///
    /// Column 0 and columns past the end of the row read as empty.
    #[must_use]
    pub fn field(&self, column: usize) -> Option<&str> {
        column
            .checked_sub(1)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_deref)
    }

    /// Returns the number of cells in this row, including empty ones.
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.len()
    }
}

/// Boxed, single-pass iterator over the rows of one section.
pub type RowIter<'a> = Box<dyn Iterator<Item = Row> + 'a>;

/// A source of named sections made of rows.
///
/// Implementations must yield rows in source order, header row first. The
/// iterator returned by [`Workbook::section`] is consumed once; call
/// `section` again for a fresh traversal.
pub trait Workbook {
    /// Names of all sections in source order.
    fn section_names(&self) -> Vec<String>;

    /// Rows of the named section, or `None` if the workbook has no such section.
    fn section(&self, name: &str) -> Option<RowIter<'_>>;

    /// Returns `true` if the workbook contains the named section.
    fn has_section(&self, name: &str) -> bool {
        self.section_names().iter().any(|candidate| candidate == name)
    }
}
