mod common;

use carscope::{
    Column, Dashboard, DashboardConfig, Selection, Table,
    chart::{self, DEFAULT_HISTOGRAM_BINS},
    error::Undefined,
    filter::{Criterion, FilterSet},
    frequency::grouped_count,
    normalize::{default_rename_map, normalize},
    stats::{self, Aggregate},
};

use common::{SAMPLE_DATA, load_fixture};

fn numeric_listings(rows: usize) -> Table {
    let models = (0..rows)
        .map(|i| ["Yaris", "Aygo", "Corolla", "RAV4"][i % 4])
        .collect::<Vec<_>>();
    let fuels = (0..rows)
        .map(|i| ["Petrol", "Diesel", "Hybrid"][i % 3])
        .collect::<Vec<_>>();
    let prices = (0..rows)
        .map(|i| 5_000.0 + 250.0 * i as f64)
        .collect::<Vec<_>>();
    let years = (0..rows)
        .map(|i| 2010.0 + (i % 10) as f64)
        .collect::<Vec<_>>();
    Table::new(vec![
        Column::text("modelo", &models),
        Column::text("combustible", &fuels),
        Column::numeric("valor", &prices),
        Column::numeric("año", &years),
    ])
    .expect("table")
}

#[test]
fn locale_prices_become_numbers_and_failures_become_missing() {
    let raw = Table::new(vec![Column::text("price", &["23.990", "15.500", "abc"])]).expect("table");
    let normalized = normalize(&raw, &default_rename_map(), Some("valor"));

    let valor = normalized.table.column("valor").expect("renamed column");
    assert_eq!(valor.numbers().collect::<Vec<_>>(), vec![23_990.0, 15_500.0]);
    assert_eq!(valor.cell(2), None);
    assert_eq!(normalized.report.parse_failures, 1);

    let metrics = stats::summary_metrics(&normalized.table, Some("valor"));
    assert_eq!(metrics.row_count, 3);
    assert_eq!(metrics.mean(), Some(19_745.0));
    assert_eq!(metrics.price.defined().map(|s| s.count), Some(2));
}

#[test]
fn normalizing_a_table_without_matching_names_keeps_it_intact() {
    let raw = Table::new(vec![
        Column::text("marca", &["Toyota", "Toyota"]),
        Column::numeric("puertas", &[3.0, 5.0]),
    ])
    .expect("table");
    let normalized = normalize(&raw, &default_rename_map(), None);
    assert_eq!(normalized.table, raw);
    assert!(normalized.report.renamed.is_empty());
}

#[test]
fn price_range_limits_the_summary() {
    let table = Table::new(vec![Column::numeric("valor", &[10.0, 20.0, 30.0, 40.0])]).expect("table");
    let filtered = FilterSet::new()
        .with(Criterion::range("valor", Some(15.0), Some(35.0)))
        .apply(&table);

    let summary = stats::summarize(&filtered, "valor")
        .into_defined()
        .expect("summary");
    assert_eq!(summary.count, 2);
    assert_eq!(summary.mean, 25.0);
    assert_eq!(summary.min, 20.0);
    assert_eq!(summary.max, 30.0);
}

#[test]
fn fuel_counts_feed_the_pie_chart() {
    let table = Table::new(vec![Column::text(
        "combustible",
        &["gasolina", "diesel", "gasolina"],
    )])
    .expect("table");
    let counts = grouped_count(&table, "combustible", 0)
        .into_defined()
        .expect("counts");
    let pairs = counts
        .iter()
        .map(|g| (g.key.as_str(), g.count))
        .collect::<Vec<_>>();
    assert_eq!(pairs, vec![("gasolina", 2), ("diesel", 1)]);

    let pie = chart::pie_series(&table, "combustible");
    assert_eq!(pie.len(), 2);
    assert_eq!(pie.iter().map(|s| s.count).sum::<usize>(), 3);
}

#[test]
fn empty_model_selection_yields_an_empty_view_without_failing() {
    let dashboard = Dashboard::new(&numeric_listings(100), DashboardConfig::default());
    let selection = Selection::new().with_models(Vec::<String>::new());
    let view = dashboard.view(&selection);

    assert_eq!(view.filtered.row_count(), 0);
    assert_eq!(view.metrics.row_count, 0);
    assert_eq!(view.metrics.price, Aggregate::Undefined(Undefined::EmptyResult));
    assert!(view.metrics.mean().is_none());
    assert!(!view.mean_by_group.is_defined());
    assert!(view.charts.fuel_pie.is_empty());
    assert!(view.charts.mean_by_group.is_empty());
    assert!(view.charts.histogram.is_empty());
}

#[test]
fn filtering_the_sample_dataset_end_to_end() {
    let dashboard = Dashboard::new(&load_fixture(SAMPLE_DATA), DashboardConfig::default());
    assert_eq!(
        dashboard.table().headers(),
        vec![
            "modelo",
            "año",
            "valor",
            "transmisión",
            "kilometraje",
            "combustible",
            "tax",
            "mpg",
            "motor"
        ]
    );
    assert_eq!(dashboard.normalize_report().parse_failures, 1);
    assert!(dashboard.table().has_column("combustible"));
    assert!(!dashboard.table().has_column("fuelType"));

    let all = dashboard.view(&Selection::new());
    assert_eq!(all.filtered.row_count(), 12);
    assert_eq!(all.metrics.min(), Some(7_495.0));
    assert_eq!(all.metrics.max(), Some(27_500.0));
    assert_eq!(all.metrics.price.defined().map(|s| s.count), Some(11));
    assert_eq!(all.charts.histogram.counts.len(), DEFAULT_HISTOGRAM_BINS);
    assert_eq!(all.charts.histogram.total(), 11);

    let fuels = all
        .fuel_counts
        .defined()
        .expect("fuel counts")
        .iter()
        .map(|g| (g.key.clone(), g.count))
        .collect::<Vec<_>>();
    assert_eq!(
        fuels,
        vec![
            ("Petrol".to_string(), 7),
            ("Hybrid".to_string(), 3),
            ("Diesel".to_string(), 2)
        ]
    );

    let means = all.mean_by_group.defined().expect("group means");
    let aygo = means.iter().find(|g| g.key.as_deref() == Some("Aygo")).expect("Aygo group");
    assert_eq!(aygo.mean, 8_742.5);
    let yaris = means.iter().find(|g| g.key.as_deref() == Some("Yaris")).expect("Yaris group");
    assert_eq!(yaris.count, 2);
    assert_eq!(yaris.mean, 12_124.0);

    let bars = chart::bar_series(&all.filtered, "modelo", "valor");
    assert_eq!(bars, all.charts.mean_by_group);
    assert_eq!(
        bars.iter().map(|b| b.category.as_str()).collect::<Vec<_>>(),
        vec!["Auris", "Aygo", "Corolla", "GT86", "RAV4", "Yaris"]
    );

    let trends = all.charts.trends.as_ref().expect("trend series");
    assert_eq!(trends.series.len(), 6);
    assert_eq!(trends.rows, 12);
}

#[test]
fn unparseable_prices_keep_their_row_but_not_their_value() {
    let dashboard = Dashboard::new(&load_fixture(SAMPLE_DATA), DashboardConfig::default());
    let view = dashboard.view(
        &Selection::new()
            .with_models(["Yaris"])
            .with_fuels(["Petrol"]),
    );
    assert_eq!(view.row_indices, vec![4, 6]);
    assert_eq!(view.metrics.row_count, 2);
    assert_eq!(view.metrics.mean(), Some(10_998.0));
    assert_eq!(view.metrics.price.defined().map(|s| s.count), Some(1));
}

#[test]
fn price_range_drops_rows_without_a_price() {
    let dashboard = Dashboard::new(&load_fixture(SAMPLE_DATA), DashboardConfig::default());
    let view = dashboard.view(&Selection::new().with_price_range(Some(10_000.0), Some(16_000.0)));
    assert_eq!(view.row_indices, vec![0, 1, 3, 4, 5, 10, 11]);
}

#[test]
fn generic_criteria_combine_with_dashboard_controls() {
    let dashboard = Dashboard::new(&load_fixture(SAMPLE_DATA), DashboardConfig::default());
    let automatic = Criterion::membership("transmisión", ["Automatic"]);
    let view = dashboard.view(&Selection::new().with_criterion(automatic.clone()));
    assert_eq!(view.row_indices, vec![2, 5, 8, 9]);

    let hybrids = dashboard.view(
        &Selection::new()
            .with_criterion(automatic)
            .with_fuels(["Hybrid"]),
    );
    assert_eq!(hybrids.row_indices, vec![2, 5, 9]);
}

#[test]
fn one_sided_price_bound_outside_the_data_keeps_no_rows() {
    let table = Table::new(vec![Column::numeric("valor", &[10_000.0, 20_000.0, 30_000.0])])
        .expect("table");
    let dashboard = Dashboard::new(&table, DashboardConfig::default());

    let floor = dashboard.view(&Selection::new().with_price_range(Some(50_000.0), None));
    assert_eq!(floor.filtered.row_count(), 0);
    assert_eq!(floor.metrics.price, Aggregate::Undefined(Undefined::EmptyResult));

    let ceiling = dashboard.view(&Selection::new().with_price_range(None, Some(5_000.0)));
    assert_eq!(ceiling.filtered.row_count(), 0);

    let narrowed = dashboard.view(&Selection::new().with_price_range(Some(15_000.0), None));
    assert_eq!(narrowed.row_indices, vec![1, 2]);
}

#[test]
fn inverted_price_range_falls_back_to_the_full_range() {
    let dashboard = Dashboard::new(&load_fixture(SAMPLE_DATA), DashboardConfig::default());
    let view = dashboard.view(&Selection::new().with_price_range(Some(20_000.0), Some(1_000.0)));
    assert_eq!(view.filtered.row_count(), 11);
}

#[test]
fn missing_group_column_reports_why_the_bars_are_empty() {
    let config = DashboardConfig {
        group_by: Some("marca".to_string()),
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::new(&numeric_listings(8), config);
    let view = dashboard.view(&Selection::new());
    assert_eq!(
        view.mean_by_group,
        Aggregate::Undefined(Undefined::MissingColumn("marca".to_string()))
    );
    assert!(view.charts.mean_by_group.is_empty());
    assert_eq!(view.metrics.price.defined().map(|s| s.count), Some(8));
}
