//! Chart-ready series.
//!
//! Every builder is a pure function of the filtered table. Undefined
//! aggregates and empty views produce empty series rather than errors, so
//! the caller can always hand the result to a renderer.

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::{
    data::Value,
    frequency::{GroupCount, grouped_count},
    schema::Classification,
    stats::{GroupMean, group_label, grouped_mean},
    table::Table,
};

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub category: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: String,
    pub value: f64,
}

/// Equal-width bins: `edges.len() == counts.len() + 1`, or both empty when
/// the column has no values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub column: String,
    /// One point per row of the filtered table; missing cells stay `None`.
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiLineSeries {
    pub rows: usize,
    pub series: Vec<LineSeries>,
}

/// Share of rows per category of `column`, only for categories present in
/// the view.
pub fn pie_series(table: &Table, column: &str) -> Vec<PieSlice> {
    grouped_count(table, column, 0)
        .defined()
        .map(|groups| pie_slices(groups))
        .unwrap_or_default()
}

pub fn pie_slices(groups: &[GroupCount]) -> Vec<PieSlice> {
    groups
        .iter()
        .map(|group| PieSlice {
            category: group.key.clone(),
            count: group.count,
            percent: group.percent,
        })
        .collect()
}

/// One bar per distinct `key` carrying the mean of `target`.
pub fn bar_series(table: &Table, key: &str, target: &str) -> Vec<Bar> {
    grouped_mean(table, key, target)
        .defined()
        .map(|groups| bars(groups))
        .unwrap_or_default()
}

pub fn bars(groups: &[GroupMean]) -> Vec<Bar> {
    groups
        .iter()
        .map(|group| Bar {
            category: group_label(group),
            value: group.mean,
        })
        .collect()
}

pub fn histogram(table: &Table, column: &str, bins: usize) -> Histogram {
    let values = table
        .column(column)
        .map(|c| c.numbers().collect::<Vec<_>>())
        .unwrap_or_default();
    histogram_of(column, &values, bins)
}

fn histogram_of(column: &str, values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let mut histogram = Histogram {
        column: column.to_string(),
        ..Histogram::default()
    };
    let (min, max) = match values.iter().copied().minmax() {
        MinMaxResult::NoElements => return histogram,
        MinMaxResult::OneElement(value) => (value, value),
        MinMaxResult::MinMax(min, max) => (min, max),
    };

    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    histogram.edges = (0..bins).map(|i| lo + width * i as f64).collect();
    histogram.edges.push(hi);
    histogram.counts = vec![0; bins];
    for &value in values {
        let slot = ((value - lo) / width).floor();
        let slot = if slot < 0.0 { 0 } else { (slot as usize).min(bins - 1) };
        histogram.counts[slot] += 1;
    }
    histogram
}

/// One series per numeric column, aligned on row position. `None` when the
/// view has fewer than two numeric columns.
pub fn multi_line_series(table: &Table, classification: &Classification) -> Option<MultiLineSeries> {
    if !classification.supports_multi_line() {
        return None;
    }
    let series = classification
        .numeric
        .iter()
        .filter_map(|name| table.column(name))
        .map(|column| LineSeries {
            column: column.name().to_string(),
            points: column
                .cells()
                .iter()
                .map(|cell| cell.as_ref().and_then(Value::as_number))
                .collect(),
        })
        .collect::<Vec<_>>();
    Some(MultiLineSeries {
        rows: table.row_count(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema::classify_columns, table::Column};

    #[test]
    fn histogram_places_maximum_in_last_bin() {
        let h = histogram_of("valor", &[0.0, 5.0, 10.0], 2);
        assert_eq!(h.edges, vec![0.0, 5.0, 10.0]);
        assert_eq!(h.counts, vec![1, 2]);
    }

    #[test]
    fn histogram_widens_constant_columns() {
        let h = histogram_of("valor", &[7.0, 7.0], 4);
        assert_eq!(h.edges.first(), Some(&6.5));
        assert_eq!(h.edges.last(), Some(&7.5));
        assert_eq!(h.total(), 2);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        let h = histogram_of("valor", &[], 20);
        assert!(h.is_empty());
        assert!(h.edges.is_empty());
    }

    #[test]
    fn multi_line_needs_two_numeric_columns() {
        let table = Table::new(vec![
            Column::text("modelo", &["Yaris", "Aygo"]),
            Column::numeric("valor", &[1.0, 2.0]),
        ])
        .expect("table");
        assert!(multi_line_series(&table, &classify_columns(&table)).is_none());

        let table = Table::new(vec![
            Column::numeric("año", &[2017.0, 2018.0]),
            Column::new("valor", vec![Some(Value::Number(1.0)), None]),
        ])
        .expect("table");
        let lines = multi_line_series(&table, &classify_columns(&table)).expect("lines");
        assert_eq!(lines.series.len(), 2);
        assert_eq!(lines.series[1].points, vec![Some(1.0), None]);
    }
}
