//! Column renaming and price coercion.
//!
//! Source files name their columns in English (`model`, `price`, ...); the
//! dashboard works on Spanish canonical names. [`normalize()`] renames the
//! known columns and turns the price column's `23.990`-style text into
//! numbers. Unreadable prices become missing cells and are counted in the
//! [`NormalizeReport`], never raised.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::{
    data::{Value, parse_locale_number},
    table::{Column, Table},
};

pub type RenameMap = BTreeMap<String, String>;

pub const DEFAULT_PRICE_COLUMN: &str = "valor";

pub const DEFAULT_RENAMES: &[(&str, &str)] = &[
    ("model", "modelo"),
    ("year", "año"),
    ("price", "valor"),
    ("transmission", "transmisión"),
    ("mileage", "kilometraje"),
    ("fuelType", "combustible"),
    ("engineSize", "motor"),
];

pub fn default_rename_map() -> RenameMap {
    DEFAULT_RENAMES
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// `(source, canonical)` pairs actually applied.
    pub renamed: Vec<(String, String)>,
    /// Renames skipped because the canonical name was already taken.
    pub skipped: Vec<(String, String)>,
    /// Price column that was coerced, when present.
    pub price_column: Option<String>,
    /// Non-empty price cells that could not be parsed.
    pub parse_failures: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: Table,
    pub report: NormalizeReport,
}

pub fn normalize(table: &Table, rename_map: &RenameMap, price_column: Option<&str>) -> Normalized {
    let mut report = NormalizeReport::default();
    let columns = rename_columns(table, rename_map, &mut report);

    let columns = match price_column {
        Some(price) => columns
            .into_iter()
            .map(|column| {
                if column.name() == price {
                    report.price_column = Some(price.to_string());
                    let (coerced, failures) = coerce_price_column(&column);
                    report.parse_failures = failures;
                    coerced
                } else {
                    column
                }
            })
            .collect(),
        None => columns,
    };

    if report.parse_failures > 0 {
        warn!(
            "{} value(s) in '{}' could not be read as numbers and are treated as missing",
            report.parse_failures,
            report.price_column.as_deref().unwrap_or_default()
        );
    }
    debug!("Normalized columns: {:?}", report.renamed);

    Normalized {
        table: Table::from_validated(columns, table.row_count()),
        report,
    }
}

fn rename_columns(table: &Table, rename_map: &RenameMap, report: &mut NormalizeReport) -> Vec<Column> {
    let mut taken: HashSet<String> = table.headers().into_iter().collect();
    table
        .columns()
        .iter()
        .map(|column| {
            let Some(target) = rename_map.get(column.name()) else {
                return column.clone();
            };
            if target == column.name() {
                return column.clone();
            }
            if taken.contains(target) {
                warn!(
                    "Not renaming '{}' to '{}': a column with that name already exists",
                    column.name(),
                    target
                );
                report
                    .skipped
                    .push((column.name().to_string(), target.clone()));
                return column.clone();
            }
            taken.remove(column.name());
            taken.insert(target.clone());
            report
                .renamed
                .push((column.name().to_string(), target.clone()));
            column.renamed(target)
        })
        .collect()
}

/// Applies the thousands-separator rule to every cell of `column`, returning
/// the coerced column and the number of cells that failed to parse.
pub fn coerce_price_column(column: &Column) -> (Column, usize) {
    let mut failures = 0usize;
    let coerced = column.map_cells(|cell| {
        let value = cell.as_ref()?;
        match parse_locale_number(&value.as_display()) {
            Some(number) => Some(Value::Number(number)),
            None => {
                failures += 1;
                None
            }
        }
    });
    (coerced, failures)
}
