//! Row filtering.
//!
//! A [`FilterSet`] holds independent [`Criterion`]s combined with logical
//! AND. Each criterion is a pure row-inclusion predicate, so the order in
//! which they are listed never changes the result.

use std::collections::BTreeSet;

use anyhow::{Result, anyhow};
use log::{debug, warn};
use serde::Serialize;

use crate::{
    data::{Value, parse_number},
    table::{Column, Table},
};

/// Closed numeric interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeBounds {
    pub lo: f64,
    pub hi: f64,
}

impl RangeBounds {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn is_valid(&self) -> bool {
        !self.lo.is_nan() && !self.hi.is_nan() && self.lo <= self.hi
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// Full `[min, max]` of the numeric cells in `column`, or `None` when the
    /// column is absent or holds no numbers.
    pub fn of_column(table: &Table, column: &str) -> Option<Self> {
        let column = table.column(column)?;
        column.numbers().fold(None, |acc, value| match acc {
            None => Some(Self::new(value, value)),
            Some(bounds) => Some(Self::new(bounds.lo.min(value), bounds.hi.max(value))),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Row kept iff the cell's display value is one of `selected`. An empty
    /// selection keeps nothing.
    Membership {
        column: String,
        selected: BTreeSet<String>,
    },
    /// Row kept iff the numeric cell lies in `[lo, hi]`. An unset side
    /// defaults to the column's own minimum or maximum.
    Range {
        column: String,
        lo: Option<f64>,
        hi: Option<f64>,
    },
}

impl Criterion {
    pub fn membership<I, S>(column: impl Into<String>, selected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criterion::Membership {
            column: column.into(),
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(column: impl Into<String>, lo: Option<f64>, hi: Option<f64>) -> Self {
        Criterion::Range {
            column: column.into(),
            lo,
            hi,
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Criterion::Membership { column, .. } | Criterion::Range { column, .. } => column,
        }
    }

    fn resolve<'a>(&'a self, table: &'a Table) -> Predicate<'a> {
        let Some(column) = table.column(self.column()) else {
            warn!(
                "Filter column '{}' is not present; no rows can match",
                self.column()
            );
            return Predicate::Never;
        };
        match self {
            Criterion::Membership { selected, .. } => {
                if selected.is_empty() {
                    debug!("Empty selection for '{}' excludes every row", column.name());
                }
                Predicate::Membership { column, selected }
            }
            Criterion::Range { lo, hi, .. } => match resolve_bounds(table, column.name(), *lo, *hi) {
                Some(bounds) => Predicate::Range { column, bounds },
                None => Predicate::Never,
            },
        }
    }
}

fn resolve_bounds(table: &Table, column: &str, lo: Option<f64>, hi: Option<f64>) -> Option<RangeBounds> {
    let default = RangeBounds::of_column(table, column);
    let has_nan = lo.is_some_and(f64::is_nan) || hi.is_some_and(f64::is_nan);
    let inverted = matches!((lo, hi), (Some(lo), Some(hi)) if lo > hi);
    if has_nan || inverted {
        warn!(
            "Ignoring invalid range [{}, {}] for '{}'; using the full column range",
            lo.map_or_else(|| "min".to_string(), |v| v.to_string()),
            hi.map_or_else(|| "max".to_string(), |v| v.to_string()),
            column
        );
        return default;
    }
    // A one-sided range filled from the column extreme may be empty.
    match (lo, hi, default) {
        (Some(lo), Some(hi), _) => Some(RangeBounds::new(lo, hi)),
        (Some(lo), None, Some(d)) => Some(RangeBounds::new(lo, d.hi)),
        (None, Some(hi), Some(d)) => Some(RangeBounds::new(d.lo, hi)),
        (None, None, d) => d,
        (_, _, None) => None,
    }
}

enum Predicate<'a> {
    Never,
    Membership {
        column: &'a Column,
        selected: &'a BTreeSet<String>,
    },
    Range {
        column: &'a Column,
        bounds: RangeBounds,
    },
}

impl Predicate<'_> {
    fn matches(&self, row: usize) -> bool {
        match self {
            Predicate::Never => false,
            Predicate::Membership { column, selected } => column
                .cell(row)
                .is_some_and(|value| selected.contains(&value.as_display())),
            Predicate::Range { column, bounds } => column
                .cell(row)
                .and_then(Value::as_number)
                .is_some_and(|value| bounds.contains(value)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    criteria: Vec<Criterion>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn push(&mut self, criterion: Criterion) {
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Positions of the rows of `table` that satisfy every criterion. Range
    /// defaults are taken from `table` itself.
    pub fn filtered_indices(&self, table: &Table) -> Vec<usize> {
        if self.criteria.is_empty() {
            return (0..table.row_count()).collect();
        }
        let predicates = self
            .criteria
            .iter()
            .map(|criterion| criterion.resolve(table))
            .collect::<Vec<_>>();
        (0..table.row_count())
            .filter(|&row| predicates.iter().all(|p| p.matches(row)))
            .collect()
    }

    pub fn apply(&self, table: &Table) -> Table {
        if self.criteria.is_empty() {
            return table.clone();
        }
        let rows = self.filtered_indices(table);
        debug!(
            "Applied {} criterion(s): kept {} of {} row(s)",
            self.criteria.len(),
            rows.len(),
            table.row_count()
        );
        table.select_rows(&rows)
    }
}

impl FromIterator<Criterion> for FilterSet {
    fn from_iter<T: IntoIterator<Item = Criterion>>(iter: T) -> Self {
        Self {
            criteria: iter.into_iter().collect(),
        }
    }
}

pub fn parse_criteria(filters: &[String]) -> Result<Vec<Criterion>> {
    filters.iter().map(|f| parse_criterion(f)).collect()
}

/// Parses `column=a,b,c` as membership and `column=lo..hi` as a range.
/// Either side of a range may be left empty (`valor=..20000`).
pub fn parse_criterion(filter: &str) -> Result<Criterion> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty filter expression"));
    }
    let Some((left, right)) = trimmed.split_once('=') else {
        return Err(anyhow!(
            "Failed to parse filter expression '{trimmed}' (expected column=values or column=lo..hi)"
        ));
    };
    let column = left.trim();
    if column.is_empty() {
        return Err(anyhow!("Filter expression '{trimmed}' is missing a column name"));
    }
    let right = unquote(right.trim());

    if let Some((lo, hi)) = right.split_once("..") {
        let lo = parse_bound(lo, trimmed)?;
        let hi = parse_bound(hi, trimmed)?;
        return Ok(Criterion::range(column, lo, hi));
    }

    let selected = right
        .split(',')
        .map(|v| unquote(v.trim()))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>();
    Ok(Criterion::Membership {
        column: column.to_string(),
        selected,
    })
}

fn parse_bound(raw: &str, expression: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_number(raw)
        .map(Some)
        .ok_or_else(|| anyhow!("Range bound '{raw}' in '{expression}' is not a number"))
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        if (bytes[0] == b'"' && bytes[value.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[value.len() - 1] == b'\'')
        {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Table {
        Table::new(vec![
            Column::text("modelo", &["Yaris", "Aygo", "Yaris", "Corolla"]),
            Column::new(
                "valor",
                vec![
                    Some(Value::Number(10.0)),
                    Some(Value::Number(20.0)),
                    None,
                    Some(Value::Number(40.0)),
                ],
            ),
        ])
        .expect("table")
    }

    #[test]
    fn no_criteria_keeps_every_row() {
        let table = listings();
        assert_eq!(FilterSet::new().apply(&table), table);
    }

    #[test]
    fn membership_matches_display_values() {
        let table = listings();
        let filters = FilterSet::new().with(Criterion::membership("modelo", ["Yaris"]));
        assert_eq!(filters.filtered_indices(&table), vec![0, 2]);
    }

    #[test]
    fn empty_membership_keeps_nothing() {
        let table = listings();
        let filters =
            FilterSet::new().with(Criterion::membership("modelo", Vec::<String>::new()));
        assert_eq!(filters.apply(&table).row_count(), 0);
    }

    #[test]
    fn default_range_only_drops_missing_values() {
        let table = listings();
        let filters = FilterSet::new().with(Criterion::range("valor", None, None));
        assert_eq!(filters.filtered_indices(&table), vec![0, 1, 3]);
    }

    #[test]
    fn half_open_range_uses_column_extreme() {
        let table = listings();
        let filters = FilterSet::new().with(Criterion::range("valor", Some(15.0), None));
        assert_eq!(filters.filtered_indices(&table), vec![1, 3]);
    }

    #[test]
    fn half_open_range_beyond_the_column_keeps_nothing() {
        let table = listings();
        let above = FilterSet::new().with(Criterion::range("valor", Some(50.0), None));
        assert!(above.filtered_indices(&table).is_empty());
        let below = FilterSet::new().with(Criterion::range("valor", None, Some(5.0)));
        assert!(below.filtered_indices(&table).is_empty());
    }

    #[test]
    fn nan_bound_falls_back_to_full_range() {
        let table = listings();
        let filters = FilterSet::new().with(Criterion::range("valor", Some(f64::NAN), None));
        assert_eq!(filters.filtered_indices(&table), vec![0, 1, 3]);
    }

    #[test]
    fn inverted_range_falls_back_to_full_range() {
        let table = listings();
        let filters = FilterSet::new().with(Criterion::range("valor", Some(50.0), Some(5.0)));
        assert_eq!(filters.filtered_indices(&table), vec![0, 1, 3]);
    }

    #[test]
    fn unknown_column_matches_nothing() {
        let table = listings();
        let filters = FilterSet::new().with(Criterion::membership("color", ["red"]));
        assert!(filters.filtered_indices(&table).is_empty());
    }

    #[test]
    fn parse_criterion_reads_membership_and_ranges() {
        assert_eq!(
            parse_criterion("modelo = Yaris, 'Aygo'").unwrap(),
            Criterion::membership("modelo", ["Aygo", "Yaris"])
        );
        assert_eq!(
            parse_criterion("valor=10000..20000").unwrap(),
            Criterion::range("valor", Some(10000.0), Some(20000.0))
        );
        assert_eq!(
            parse_criterion("valor=..5").unwrap(),
            Criterion::range("valor", None, Some(5.0))
        );
        assert_eq!(
            parse_criterion("modelo=").unwrap(),
            Criterion::membership("modelo", Vec::<String>::new())
        );
        assert!(parse_criterion("valor=a..b").is_err());
        assert!(parse_criterion("modelo").is_err());
        assert!(parse_criterion("=x").is_err());
    }
}
