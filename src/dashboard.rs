//! The per-filter-change pipeline.
//!
//! A [`Dashboard`] owns the normalized table and the configuration, both
//! read-only once built. [`Dashboard::view()`] is a pure function of that
//! baseline and a [`Selection`]: it filters, aggregates and builds every
//! chart series from scratch, so several selections can be evaluated against
//! the same `Dashboard` by shared reference.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    chart::{self, Bar, Histogram, MultiLineSeries, PieSlice},
    config::{CANONICAL_FUEL_COLUMN, DashboardConfig},
    error::Undefined,
    filter::{Criterion, FilterSet, RangeBounds},
    frequency::{GroupCount, grouped_count},
    normalize::{DEFAULT_PRICE_COLUMN, NormalizeReport, normalize},
    schema::{self, Classification, ColumnKind},
    stats::{self, Aggregate, GroupMean, SummaryMetrics},
    table::Table,
};

/// What the user picked. `None` means the control is untouched and does not
/// filter; `Some` of an empty set deliberately excludes every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub models: Option<BTreeSet<String>>,
    pub fuels: Option<BTreeSet<String>>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    /// Extra criteria over any other column.
    pub criteria: Vec<Criterion>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fuels<I, S>(mut self, fuels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fuels = Some(fuels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_price_range(mut self, lo: Option<f64>, hi: Option<f64>) -> Self {
        self.price_min = lo;
        self.price_max = hi;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }
}

/// Choices offered for one filterable column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FilterOption {
    Categorical { column: String, values: Vec<String> },
    Numeric { column: String, bounds: Option<RangeBounds> },
}

impl FilterOption {
    pub fn column(&self) -> &str {
        match self {
            FilterOption::Categorical { column, .. } | FilterOption::Numeric { column, .. } => {
                column
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub fuel_pie: Vec<PieSlice>,
    pub mean_by_group: Vec<Bar>,
    pub histogram: Histogram,
    pub trends: Option<MultiLineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub filtered: Table,
    pub row_indices: Vec<usize>,
    pub metrics: SummaryMetrics,
    pub mean_by_group: Aggregate<Vec<GroupMean>>,
    pub fuel_counts: Aggregate<Vec<GroupCount>>,
    pub charts: Charts,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Table,
    config: DashboardConfig,
    classification: Classification,
    fuel_column: Option<String>,
    report: NormalizeReport,
}

impl Dashboard {
    /// Normalizes `raw` once; every later view reads the result.
    pub fn new(raw: &Table, config: DashboardConfig) -> Self {
        let normalized = normalize(raw, &config.rename_map, config.price_column());
        let table = normalized.table;
        let classification = schema::classify_columns(&table);
        let fuel_column = match config.fuel_column.as_deref() {
            Some(column) => Some(column.to_string()),
            None => schema::find_fuel_column(&table, CANONICAL_FUEL_COLUMN).map(str::to_string),
        };
        debug!(
            "Classified columns: numeric={:?} categorical={:?}",
            classification.numeric, classification.categorical
        );
        match &fuel_column {
            Some(column) => debug!("Using '{column}' as the fuel-type column"),
            None => debug!("No fuel-type column detected"),
        }
        Self {
            table,
            config,
            classification,
            fuel_column,
            report: normalized.report,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn fuel_column(&self) -> Option<&str> {
        self.fuel_column.as_deref()
    }

    pub fn normalize_report(&self) -> &NormalizeReport {
        &self.report
    }

    /// One option per column: distinct values for categorical columns, the
    /// full range for numeric ones.
    pub fn filter_options(&self) -> Vec<FilterOption> {
        schema::describe_columns(&self.table)
            .into_iter()
            .map(|descriptor| match descriptor.kind {
                ColumnKind::Categorical => FilterOption::Categorical {
                    values: schema::distinct_values(&self.table, &descriptor.name),
                    column: descriptor.name,
                },
                ColumnKind::Numeric => FilterOption::Numeric {
                    bounds: RangeBounds::of_column(&self.table, &descriptor.name),
                    column: descriptor.name,
                },
            })
            .collect()
    }

    /// Translates the dashboard controls into filter criteria.
    pub fn filter_set(&self, selection: &Selection) -> FilterSet {
        let mut filters = FilterSet::new();
        if let Some(models) = &selection.models {
            filters.push(Criterion::Membership {
                column: self.config.model_column().to_string(),
                selected: models.clone(),
            });
        }
        if let Some(fuels) = &selection.fuels {
            let column = self.fuel_column().unwrap_or_else(|| {
                warn!("Fuel selection given but no fuel-type column was found");
                CANONICAL_FUEL_COLUMN
            });
            filters.push(Criterion::Membership {
                column: column.to_string(),
                selected: fuels.clone(),
            });
        }
        if selection.price_min.is_some() || selection.price_max.is_some() {
            let column = self.config.price_column().unwrap_or_else(|| {
                warn!("Price range given but no price column is configured");
                DEFAULT_PRICE_COLUMN
            });
            filters.push(Criterion::range(column, selection.price_min, selection.price_max));
        }
        for criterion in &selection.criteria {
            filters.push(criterion.clone());
        }
        filters
    }

    pub fn view(&self, selection: &Selection) -> DashboardView {
        let filters = self.filter_set(selection);
        let row_indices = filters.filtered_indices(&self.table);
        let filtered = self.table.select_rows(&row_indices);
        info!(
            "{} of {} row(s) match {} criterion(s)",
            filtered.row_count(),
            self.table.row_count(),
            filters.len()
        );

        let metrics = stats::summary_metrics(&filtered, self.config.price_column());
        let mean_by_group = match (self.config.group_by(), self.config.numeric_target()) {
            (Some(key), Some(target)) => stats::grouped_mean(&filtered, key, target),
            (None, _) => Aggregate::Undefined(Undefined::NotConfigured("group_by".to_string())),
            (_, None) => {
                Aggregate::Undefined(Undefined::NotConfigured("numeric_target".to_string()))
            }
        };
        let fuel_counts = match self.fuel_column() {
            Some(column) => grouped_count(&filtered, column, 0),
            None => Aggregate::Undefined(Undefined::MissingColumn(
                CANONICAL_FUEL_COLUMN.to_string(),
            )),
        };
        let charts = self.charts(&filtered, &mean_by_group, &fuel_counts);

        DashboardView {
            filtered,
            row_indices,
            metrics,
            mean_by_group,
            fuel_counts,
            charts,
        }
    }

    fn charts(
        &self,
        filtered: &Table,
        mean_by_group: &Aggregate<Vec<GroupMean>>,
        fuel_counts: &Aggregate<Vec<GroupCount>>,
    ) -> Charts {
        let fuel_pie = fuel_counts
            .defined()
            .map(|groups| chart::pie_slices(groups))
            .unwrap_or_default();
        let bars = mean_by_group
            .defined()
            .map(|groups| chart::bars(groups))
            .unwrap_or_default();
        let histogram = match self.config.numeric_target() {
            Some(column) => chart::histogram(filtered, column, self.config.histogram_bins),
            None => Histogram::default(),
        };
        let trends = chart::multi_line_series(filtered, &self.classification);
        Charts {
            fuel_pie,
            mean_by_group: bars,
            histogram,
            trends,
        }
    }
}
