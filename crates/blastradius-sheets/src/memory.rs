//! A workbook held entirely in memory.
//!
//! Every loader in this crate produces a [`MemoryWorkbook`]; tests build one
//! directly with [`MemoryWorkbook::with_section`].

use crate::workbook::{Row, RowIter, Workbook};

/// Raw cell grid of one section, header row included.
pub type SectionRows = Vec<Vec<Option<String>>>;

/// Sections kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryWorkbook {
    sections: Vec<(String, SectionRows)>,
}

impl MemoryWorkbook {
    /// Create an empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryWorkbook::add_section`] taking plain string cells.
    ///
    /// Empty strings become empty cells.
    #[must_use]
    pub fn with_section<R, C>(mut self, name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        (!cell.is_empty()).then(|| cell.to_string())
                    })
                    .collect()
            })
            .collect();
        self.add_section(name, rows);
        self
    }

    /// Add a section, replacing any existing section with the same name.
    pub fn add_section(&mut self, name: impl Into<String>, rows: SectionRows) {
        let name = name.into();
        if let Some(existing) = self.sections.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = rows;
        } else {
            self.sections.push((name, rows));
        }
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if the workbook has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Workbook for MemoryWorkbook {
    fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|(name, _)| name.clone()).collect()
    }

    fn section(&self, name: &str) -> Option<RowIter<'_>> {
        let (_, rows) = self.sections.iter().find(|(n, _)| n == name)?;
        Some(Box::new(
            rows.iter()
                .enumerate()
                .map(|(index, cells)| Row::new(index + 1, cells.clone())),
        ))
    }
}
