pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod frequency;
pub mod io_utils;
pub mod normalize;
pub mod render;
pub mod report;
pub mod schema;
pub mod stats;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use crate::{
    config::DashboardConfig,
    dashboard::{Dashboard, DashboardView, Selection},
    table::{Column, Table},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("carscope", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Dashboard(args) => report::execute_dashboard(&args),
        Commands::Columns(args) => report::execute_columns(&args),
        Commands::Export(args) => report::execute_export(&args),
    }
}
