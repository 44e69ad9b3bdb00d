use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore vehicle listing datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Filter the listings and print metrics, aggregates and chart series
    Dashboard(DashboardArgs),
    /// List normalized columns with their kind and filter options
    Columns(ColumnsArgs),
    /// Write the filtered, normalized listings as CSV
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file with the listings (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML file overriding renames, price column and chart settings
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// Models to keep (repeatable or comma-separated; an empty value keeps none)
    #[arg(long = "model", action = clap::ArgAction::Append, value_delimiter = ',')]
    pub models: Vec<String>,
    /// Fuel types to keep (repeatable or comma-separated; an empty value keeps none)
    #[arg(long = "fuel", action = clap::ArgAction::Append, value_delimiter = ',')]
    pub fuels: Vec<String>,
    /// Lower price bound (defaults to the cheapest listing)
    #[arg(long = "price-min", allow_negative_numbers = true)]
    pub price_min: Option<f64>,
    /// Upper price bound (defaults to the most expensive listing)
    #[arg(long = "price-max", allow_negative_numbers = true)]
    pub price_max: Option<f64>,
    /// Extra criteria such as `transmisión=Manual,Automatic` or `año=2015..2019`
    #[arg(long = "filter", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
}

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Number of filtered rows to display (0 = all)
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Emit the whole view as one JSON document
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Delimiter to use for output (defaults to the input delimiter)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
