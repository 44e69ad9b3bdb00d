use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::{error::Undefined, stats::Aggregate, table::Table};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
    /// Share of the counted rows, `0.0..=100.0`.
    pub percent: f64,
}

/// Rows per distinct value of `key`, most frequent first, ties broken by
/// key. Rows whose key is missing are not counted. `top > 0` keeps only the
/// `top` most frequent keys.
pub fn grouped_count(table: &Table, key: &str, top: usize) -> Aggregate<Vec<GroupCount>> {
    let Some(column) = table.column(key) else {
        return Aggregate::Undefined(Undefined::MissingColumn(key.to_string()));
    };
    if table.is_empty() {
        return Aggregate::Undefined(Undefined::EmptyResult);
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;
    for value in column.cells().iter().flatten() {
        *counts.entry(value.as_display()).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return Aggregate::Defined(Vec::new());
    }

    let mut items = counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect::<Vec<_>>();
    if top > 0 && items.len() > top {
        items.truncate(top);
    }
    Aggregate::Defined(
        items
            .into_iter()
            .map(|(key, count)| GroupCount {
                key,
                count,
                percent: (count as f64 / total as f64) * 100.0,
            })
            .collect(),
    )
}

pub fn render_rows(column: &str, groups: &[GroupCount]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|group| {
            vec![
                column.to_string(),
                group.key.clone(),
                group.count.to_string(),
                format!("{:.2}%", group.percent),
            ]
        })
        .collect()
}
