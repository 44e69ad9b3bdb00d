use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    data::{Value, format_number},
    error::Undefined,
    table::Table,
};

/// Result of a reduction that may not exist for the current view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Aggregate<T> {
    Defined(T),
    Undefined(Undefined),
}

impl<T> Aggregate<T> {
    pub fn defined(&self) -> Option<&T> {
        match self {
            Aggregate::Defined(value) => Some(value),
            Aggregate::Undefined(_) => None,
        }
    }

    pub fn into_defined(self) -> Option<T> {
        match self {
            Aggregate::Defined(value) => Some(value),
            Aggregate::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Aggregate::Defined(_))
    }

    pub fn reason(&self) -> Option<&Undefined> {
        match self {
            Aggregate::Defined(_) => None,
            Aggregate::Undefined(reason) => Some(reason),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Aggregate<U> {
        match self {
            Aggregate::Defined(value) => Aggregate::Defined(f(value)),
            Aggregate::Undefined(reason) => Aggregate::Undefined(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Non-missing values that took part in the reduction.
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Sample standard deviation; needs at least two values.
    pub std_dev: Option<f64>,
}

/// Row count plus the price summary shown in the metric tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub row_count: usize,
    pub column: Option<String>,
    pub price: Aggregate<NumericSummary>,
}

impl SummaryMetrics {
    pub fn mean(&self) -> Option<f64> {
        self.price.defined().map(|s| s.mean)
    }

    pub fn min(&self) -> Option<f64> {
        self.price.defined().map(|s| s.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.price.defined().map(|s| s.max)
    }
}

/// Label shown for the group of rows whose key cell is missing.
pub const MISSING_KEY_LABEL: &str = "(missing)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    /// `None` collects the rows whose key cell is missing.
    pub key: Option<String>,
    pub mean: f64,
    /// Non-missing target values averaged for this key.
    pub count: usize,
}

pub fn summary_metrics(table: &Table, price_column: Option<&str>) -> SummaryMetrics {
    let price = match price_column {
        Some(column) => summarize(table, column),
        None => Aggregate::Undefined(Undefined::NotConfigured("price".to_string())),
    };
    SummaryMetrics {
        row_count: table.row_count(),
        column: price_column.map(str::to_string),
        price,
    }
}

/// Mean, min, max, median and standard deviation of the numeric cells of
/// `column`. Missing and non-numeric cells are skipped.
pub fn summarize(table: &Table, column: &str) -> Aggregate<NumericSummary> {
    let Some(data) = table.column(column) else {
        return Aggregate::Undefined(Undefined::MissingColumn(column.to_string()));
    };
    if table.is_empty() {
        return Aggregate::Undefined(Undefined::EmptyResult);
    }
    let mut stats = ColumnStats::default();
    for value in data.numbers() {
        stats.add_value(value);
    }
    match stats.summary() {
        Some(summary) => Aggregate::Defined(summary),
        None => Aggregate::Undefined(Undefined::NoNumericValues(column.to_string())),
    }
}

/// Mean of `target` per distinct `key`, ordered by key with the missing-key
/// group first. Rows whose target is missing are skipped, so the group
/// counts add up to the non-missing count of `target`.
pub fn grouped_mean(table: &Table, key: &str, target: &str) -> Aggregate<Vec<GroupMean>> {
    let Some(keys) = table.column(key) else {
        return Aggregate::Undefined(Undefined::MissingColumn(key.to_string()));
    };
    let Some(values) = table.column(target) else {
        return Aggregate::Undefined(Undefined::MissingColumn(target.to_string()));
    };
    if table.is_empty() {
        return Aggregate::Undefined(Undefined::EmptyResult);
    }

    let mut groups: BTreeMap<Option<String>, ColumnStats> = BTreeMap::new();
    for (key_cell, value_cell) in keys.cells().iter().zip(values.cells()) {
        let Some(number) = value_cell.as_ref().and_then(Value::as_number) else {
            continue;
        };
        groups
            .entry(key_cell.as_ref().map(Value::as_display))
            .or_default()
            .add_value(number);
    }
    if groups.is_empty() {
        return Aggregate::Undefined(Undefined::NoNumericValues(target.to_string()));
    }

    Aggregate::Defined(
        groups
            .into_iter()
            .filter_map(|(key, stats)| {
                stats.mean().map(|mean| GroupMean {
                    key,
                    mean,
                    count: stats.count,
                })
            })
            .collect(),
    )
}

#[derive(Debug, Default)]
struct ColumnStats {
    values: Vec<f64>,
    sum: f64,
    sum_squares: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    fn add_value(&mut self, numeric: f64) {
        self.count += 1;
        self.sum += numeric;
        self.sum_squares += numeric * numeric;
        self.min = Some(match self.min {
            Some(current) => current.min(numeric),
            None => numeric,
        });
        self.max = Some(match self.max {
            Some(current) => current.max(numeric),
            None => numeric,
        });
        self.values.push(numeric);
    }

    fn mean(&self) -> Option<f64> {
        if self.count > 0 {
            Some(self.sum / self.count as f64)
        } else {
            None
        }
    }

    fn median(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len().is_multiple_of(2) {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    fn std_dev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let mean = self.mean()?;
        let variance =
            (self.sum_squares - self.count as f64 * mean * mean) / (self.count as f64 - 1.0);
        Some(variance.max(0.0).sqrt())
    }

    fn summary(&self) -> Option<NumericSummary> {
        Some(NumericSummary {
            count: self.count,
            mean: self.mean()?,
            min: self.min?,
            max: self.max?,
            median: self.median()?,
            std_dev: self.std_dev(),
        })
    }
}

/// Rows for the metric table: one line per figure, undefined figures shown
/// as `n/a`.
pub fn render_rows(metrics: &SummaryMetrics) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["count".to_string(), metrics.row_count.to_string()]];
    let summary = metrics.price.defined();
    let figure = |value: Option<f64>| value.map(format_metric).unwrap_or_else(|| "n/a".to_string());
    rows.push(vec!["mean".to_string(), figure(summary.map(|s| s.mean))]);
    rows.push(vec!["min".to_string(), figure(summary.map(|s| s.min))]);
    rows.push(vec!["max".to_string(), figure(summary.map(|s| s.max))]);
    rows.push(vec!["median".to_string(), figure(summary.map(|s| s.median))]);
    rows.push(vec![
        "std_dev".to_string(),
        figure(summary.and_then(|s| s.std_dev)),
    ]);
    rows
}

pub fn render_group_means(groups: &[GroupMean]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|group| {
            vec![
                group_label(group),
                format_metric(group.mean),
                group.count.to_string(),
            ]
        })
        .collect()
}

pub fn group_label(group: &GroupMean) -> String {
    group
        .key
        .clone()
        .unwrap_or_else(|| MISSING_KEY_LABEL.to_string())
}

pub fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{value:.2}")
    }
}
