//! Command handlers: load the listings, run one dashboard view and print it.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::{ColumnsArgs, DashboardArgs, ExportArgs, FilterArgs, InputArgs},
    config::DashboardConfig,
    dashboard::{Dashboard, DashboardView, FilterOption, Selection},
    data::format_number,
    filter, frequency, io_utils,
    render::TextTable,
    stats::{self, Aggregate, format_metric},
};

pub fn load_dashboard(args: &InputArgs) -> Result<Dashboard> {
    let config = DashboardConfig::load_or_default(args.config.as_deref())?;
    let options = io_utils::LoadOptions {
        delimiter: io_utils::resolve_input_delimiter(&args.input, args.delimiter),
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        verbatim_columns: config.verbatim_columns(),
    };
    let raw = io_utils::load_table(&args.input, &options)?;
    info!(
        "Loaded {} row(s) and {} column(s) from {:?}",
        raw.row_count(),
        raw.column_count(),
        args.input
    );
    Ok(Dashboard::new(&raw, config))
}

pub fn selection_from_args(args: &FilterArgs) -> Result<Selection> {
    Ok(Selection {
        models: chosen_values(&args.models),
        fuels: chosen_values(&args.fuels),
        price_min: args.price_min,
        price_max: args.price_max,
        criteria: filter::parse_criteria(&args.filters)?,
    })
}

/// An untouched flag means "no filter"; a flag given only empty values means
/// "nothing selected".
fn chosen_values(values: &[String]) -> Option<BTreeSet<String>> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

pub fn execute_dashboard(args: &DashboardArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.input)?;
    let selection = selection_from_args(&args.filters)?;
    let view = dashboard.view(&selection);
    if args.json {
        let json = serde_json::to_string_pretty(&view).context("Serializing dashboard view")?;
        println!("{json}");
    } else {
        print!("{}", render_view(&dashboard, &view, args.rows));
    }
    Ok(())
}

pub fn render_view(dashboard: &Dashboard, view: &DashboardView, rows: usize) -> String {
    let config = dashboard.config();
    let mut output = String::new();

    output.push_str(&format!(
        "== Listings ({} of {} row(s))\n",
        view.filtered.row_count(),
        dashboard.table().row_count()
    ));
    if view.filtered.is_empty() {
        output.push_str("No listings match the current filters.\n");
    } else {
        output.push_str(
            &TextTable::from_frame(&view.filtered, rows, Some(view.row_indices.as_slice())).render(),
        );
    }

    let price_title = format!(
        "Price metrics ({})",
        config.price_column().unwrap_or("not configured")
    );
    output.push_str(
        &TextTable::new(&["metric", "value"])
            .titled(price_title)
            .with_rows(stats::render_rows(&view.metrics))
            .render(),
    );
    if let Some(reason) = view.metrics.price.reason() {
        output.push_str(&format!("({reason})\n"));
    }

    output.push_str(
        &TextTable::new(&[config.group_by().unwrap_or("group"), "mean", "count"])
            .titled("Mean by group")
            .with_rows(
                view.mean_by_group
                    .defined()
                    .map(|groups| stats::render_group_means(groups))
                    .unwrap_or_default(),
            )
            .or_note(undefined_note(&view.mean_by_group))
            .render(),
    );

    output.push_str(
        &TextTable::new(&["column", "value", "count", "percent"])
            .titled("Fuel share")
            .with_rows(
                view.fuel_counts
                    .defined()
                    .map(|groups| {
                        frequency::render_rows(dashboard.fuel_column().unwrap_or_default(), groups)
                    })
                    .unwrap_or_default(),
            )
            .or_note(undefined_note(&view.fuel_counts))
            .render(),
    );

    let histogram = &view.charts.histogram;
    let histogram_rows = histogram
        .counts
        .iter()
        .enumerate()
        .map(|(idx, count)| {
            vec![
                format!(
                    "{}..{}",
                    format_metric(histogram.edges[idx]),
                    format_metric(histogram.edges[idx + 1])
                ),
                count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    output.push_str(
        &TextTable::new(&["bin", "count"])
            .titled(format!("Histogram ({})", histogram.column))
            .with_rows(histogram_rows)
            .or_note("n/a (no values to bin)")
            .render(),
    );

    output.push_str("== Trends\n");
    match &view.charts.trends {
        Some(trends) => {
            let names = trends
                .series
                .iter()
                .map(|s| s.column.as_str())
                .collect::<Vec<_>>();
            output.push_str(&format!(
                "{} series over {} row(s): {}\n",
                trends.series.len(),
                trends.rows,
                names.join(", ")
            ));
        }
        None => output.push_str("n/a (needs at least two numeric columns)\n"),
    }
    output
}

fn undefined_note<T>(aggregate: &Aggregate<T>) -> String {
    match aggregate.reason() {
        Some(reason) => format!("n/a ({reason})"),
        None => "n/a (no groups)".to_string(),
    }
}

pub fn execute_columns(args: &ColumnsArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.input)?;
    let report = dashboard.normalize_report();
    for (from, to) in &report.renamed {
        info!("Renamed '{from}' to '{to}'");
    }
    let options = dashboard.filter_options();
    let rows = options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let (kind, detail) = match option {
                FilterOption::Categorical { values, .. } => {
                    ("categorical", format!("{} distinct value(s)", values.len()))
                }
                FilterOption::Numeric { bounds, .. } => (
                    "numeric",
                    bounds
                        .map(|b| format!("{} to {}", format_number(b.lo), format_number(b.hi)))
                        .unwrap_or_else(|| "no values".to_string()),
                ),
            };
            vec![
                (idx + 1).to_string(),
                option.column().to_string(),
                kind.to_string(),
                detail,
            ]
        })
        .collect::<Vec<_>>();
    print!(
        "{}",
        TextTable::new(&["#", "name", "kind", "options"])
            .with_rows(rows)
            .render()
    );
    if report.parse_failures > 0 {
        println!(
            "{} price value(s) could not be parsed and are treated as missing",
            report.parse_failures
        );
    }
    Ok(())
}

pub fn execute_export(args: &ExportArgs) -> Result<()> {
    let dashboard = load_dashboard(&args.input)?;
    let selection = selection_from_args(&args.filters)?;
    let filtered = dashboard.filter_set(&selection).apply(dashboard.table());
    let delimiter = args.output_delimiter.unwrap_or_else(|| {
        io_utils::resolve_input_delimiter(&args.input.input, args.input.delimiter)
    });
    io_utils::write_table(&filtered, args.output.as_deref(), delimiter)?;
    info!(
        "Exported {} of {} row(s)",
        filtered.row_count(),
        dashboard.table().row_count()
    );
    Ok(())
}
