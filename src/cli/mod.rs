//! Command-line parsing for the economic dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetching/reshaping code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "econ", version, about = "World Bank indicators and IMF WEO projections dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand (override `.env` / environment).
#[derive(Debug, Args, Clone, Default)]
pub struct GlobalArgs {
    /// More detailed logs (debug level for this crate).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for downloaded WEO files and the TUI log.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// World Bank API base URL.
    #[arg(long, global = true, value_name = "URL")]
    pub wb_api_base: Option<String>,

    /// First month tried when looking for the latest WEO release (1-12).
    #[arg(long, global = true, value_name = "MONTH")]
    pub weo_month: Option<u32>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (analysis + projections tabs).
    Tui(TuiArgs),
    /// Fetch indicators for some countries and print the chart panels.
    Analyze(AnalyzeArgs),
    /// Download the latest WEO release and print projections for one country.
    Projections(ProjectionsArgs),
    /// List the indicator catalog.
    Catalog,
    /// List the World Bank countries and aggregates.
    Countries,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    /// First year of the initial range.
    #[arg(long)]
    pub start: Option<i32>,

    /// Last year of the initial range (defaults to the current year).
    #[arg(long)]
    pub end: Option<i32>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Countries by World Bank id or name, comma separated.
    #[arg(short, long, value_delimiter = ',', default_values = ["FRA", "USA"])]
    pub countries: Vec<String>,

    /// First year (inclusive).
    #[arg(long, default_value_t = crate::domain::MIN_YEAR)]
    pub start: i32,

    /// Last year (inclusive, defaults to the current year).
    #[arg(long)]
    pub end: Option<i32>,

    /// Render an ASCII plot under each panel.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 14)]
    pub height: usize,

    /// Export the tidy observation table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ProjectionsArgs {
    /// Country by WEO name or ISO code.
    #[arg(short, long)]
    pub country: String,

    /// Release year (defaults to the current year).
    #[arg(long)]
    pub year: Option<i32>,

    /// Render an ASCII plot per series.
    #[arg(long)]
    pub plot: bool,

    /// Export the projection table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
