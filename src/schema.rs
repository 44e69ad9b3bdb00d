//! Column classification.
//!
//! Splits a table's columns into numeric and categorical sets, which decides
//! whether a column is filtered by range or by membership and whether the
//! multi-line chart applies. Also hosts the fuel-type column matcher and the
//! distinct-value listing used to populate membership filters.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    table::{Column, Table},
};

/// Name fragments that identify a fuel-type column, in priority order.
pub const FUEL_COLUMN_HINTS: &[&str] = &["combustible", "fuel", "tipo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
}

/// Disjoint numeric and categorical column names, each in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl Classification {
    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        if self.is_numeric(column) {
            Some(ColumnKind::Numeric)
        } else if self.is_categorical(column) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }

    /// Overlaid trend lines need at least two numeric columns.
    pub fn supports_multi_line(&self) -> bool {
        self.numeric.len() >= 2
    }
}

/// A column is numeric when every cell is a number or missing. An all-missing
/// column counts as numeric.
pub fn column_kind(column: &Column) -> ColumnKind {
    let all_numeric = column
        .cells()
        .iter()
        .flatten()
        .all(Value::is_number);
    if all_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

pub fn describe_columns(table: &Table) -> Vec<ColumnDescriptor> {
    table
        .columns()
        .iter()
        .map(|column| ColumnDescriptor {
            name: column.name().to_string(),
            kind: column_kind(column),
        })
        .collect()
}

pub fn classify_columns(table: &Table) -> Classification {
    let mut classification = Classification::default();
    for descriptor in describe_columns(table) {
        match descriptor.kind {
            ColumnKind::Numeric => classification.numeric.push(descriptor.name),
            ColumnKind::Categorical => classification.categorical.push(descriptor.name),
        }
    }
    classification
}

/// Locates the fuel-type column. An exact `canonical` name wins; otherwise
/// the first column, in table order, whose lowercased name contains one of
/// [`FUEL_COLUMN_HINTS`].
pub fn find_fuel_column<'a>(table: &'a Table, canonical: &str) -> Option<&'a str> {
    if let Some(column) = table.column(canonical) {
        return Some(column.name());
    }
    find_column_by_hints(table, FUEL_COLUMN_HINTS)
}

pub fn find_column_by_hints<'a>(table: &'a Table, hints: &[&str]) -> Option<&'a str> {
    table
        .columns()
        .iter()
        .map(Column::name)
        .find(|name| {
            let lowered = name.to_lowercase();
            hints.iter().any(|hint| lowered.contains(hint))
        })
}

/// Sorted distinct display values of `column`, missing cells excluded.
/// Returns an empty list when the column is absent.
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    let Some(column) = table.column(column) else {
        return Vec::new();
    };
    column
        .cells()
        .iter()
        .flatten()
        .map(Value::as_display)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
