use serde::Serialize;
use thiserror::Error;

/// Structural faults raised while assembling a [`crate::table::Table`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Column '{column}' has {actual} value(s) but the table has {expected} row(s)")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// Why an aggregate has no value. These are expected data-shape outcomes,
/// reported to the caller instead of being raised.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "column", rename_all = "snake_case")]
pub enum Undefined {
    #[error("column '{0}' is not present")]
    MissingColumn(String),
    #[error("no rows match the current filters")]
    EmptyResult,
    #[error("column '{0}' has no numeric values")]
    NoNumericValues(String),
    #[error("no {0} column is configured")]
    NotConfigured(String),
}
