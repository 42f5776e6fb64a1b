//! Field Normalizer Module
//! Derives cleaned per-row series from raw response columns.
//!
//! Matching and display need different treatment of missing cells, so each
//! has its own function:
//! - [`FieldNormalizer::normalize_for_match`]: lower-cased, trimmed, missing -> `""`
//! - [`FieldNormalizer::normalize_for_display`]: trimmed, case kept, missing -> `"(Missing)"`

use super::loader::ResponseTable;

/// Label used for missing cells in counts and charts.
pub const MISSING_LABEL: &str = "(Missing)";

/// A per-row derived value, aligned with the source table by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSeries {
    name: String,
    values: Vec<String>,
}

impl DerivedSeries {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// Free-text cells of one column; `None` marks a missing cell.
///
/// Empty when the column is absent from the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSeries {
    cells: Vec<Option<String>>,
}

impl TextSeries {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Option<String>] {
        &self.cells
    }

    /// Present cells only, in row order.
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().filter_map(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Produces derived series from a [`ResponseTable`].
pub struct FieldNormalizer;

impl FieldNormalizer {
    /// Lower-cased, trimmed values with missing cells as the empty string.
    ///
    /// An absent column yields one empty string per row.
    pub fn normalize_for_match(table: &ResponseTable, column: &str) -> DerivedSeries {
        let values = Self::raw_cells(table, column)
            .into_iter()
            .map(|cell| cell.map(|v| v.trim().to_lowercase()).unwrap_or_default())
            .collect();
        DerivedSeries::new(column, values)
    }

    /// Trimmed values with null or blank cells replaced by [`MISSING_LABEL`].
    ///
    /// Case is preserved. An absent column yields the missing label per row.
    pub fn normalize_for_display(table: &ResponseTable, column: &str) -> DerivedSeries {
        let values = Self::raw_cells(table, column)
            .into_iter()
            .map(|cell| match cell.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => MISSING_LABEL.to_string(),
            })
            .collect();
        DerivedSeries::new(column, values)
    }

    /// Raw free-text cells, missing kept as `None`.
    pub fn free_text(table: &ResponseTable, column: &str) -> TextSeries {
        TextSeries::new(table.cells(column).unwrap_or_default())
    }

    fn raw_cells(table: &ResponseTable, column: &str) -> Vec<Option<String>> {
        table
            .cells(column)
            .unwrap_or_else(|| vec![None; table.height()])
    }
}
