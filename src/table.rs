//! In-memory columnar table.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. Row
//! `i` across every column describes one listing. Tables are immutable once
//! built: renaming, retyping and filtering all produce a new `Table`.

use std::collections::HashSet;

use serde::Serialize;

use crate::{data::Value, error::TableError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    cells: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn numeric(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().map(|v| Some(Value::Number(*v))).collect())
    }

    pub fn text<S: AsRef<str>>(name: impl Into<String>, values: &[S]) -> Self {
        Self::new(
            name,
            values
                .iter()
                .map(|v| Some(Value::Text(v.as_ref().to_string())))
                .collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }

    pub fn cell(&self, row: usize) -> Option<&Value> {
        self.cells.get(row).and_then(|cell| cell.as_ref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Non-missing numeric cells, in row order.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| cell.as_ref().and_then(Value::as_number))
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    pub(crate) fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: self.cells.clone(),
        }
    }

    pub(crate) fn map_cells<F>(&self, f: F) -> Self
    where
        F: FnMut(&Option<Value>) -> Option<Value>,
    {
        Self {
            name: self.name.clone(),
            cells: self.cells.iter().map(f).collect(),
        }
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            cells: rows
                .iter()
                .map(|&row| self.cells.get(row).cloned().flatten())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: row_count,
                    actual: column.len(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Builds a table from columns already known to share `row_count` and to
    /// carry unique names.
    pub(crate) fn from_validated(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == row_count));
        Self { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns a new table holding only `rows`, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        let columns = self.columns.iter().map(|c| c.take_rows(rows)).collect();
        Table::from_validated(columns, rows.len())
    }

    /// Display strings for the first `limit` rows (`0` = all rows). Missing
    /// cells render as empty strings.
    pub fn display_rows(&self, limit: usize) -> Vec<Vec<String>> {
        let take = if limit == 0 {
            self.row_count
        } else {
            limit.min(self.row_count)
        };
        (0..take)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.cell(row).map(Value::as_display).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}
