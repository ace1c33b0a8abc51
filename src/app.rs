//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and layers them over `.env` settings
//! - initializes logging
//! - dispatches to the TUI or to one of the print-only commands

use clap::Parser;
use tracing::info;

use crate::chart::{ChartKind, ChartPanel, CountrySeries, PanelBody};
use crate::cli::{AnalyzeArgs, Command, GlobalArgs, ProjectionsArgs, TuiArgs};
use crate::config::Settings;
use crate::data::IndicatorSource;
use crate::data::WorldBankClient;
use crate::data::weo::HttpWeoDownloader;
use crate::domain::{MIN_YEAR, YearRange, current_year};
use crate::error::AppError;
use crate::plot::{PlotSeries, ReferenceLines, render_series_plot};
use crate::projections::{ProjectionKind, Projections};

pub mod pipeline;

/// Entry point for the `econ` binary.
pub fn run() -> Result<(), AppError> {
    // We want `econ` and `econ --start 2000` to behave like `econ tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = settings_from_args(&cli.global)?;

    // The TUI owns the terminal and sets up its own file logger.
    if !matches!(cli.command, Command::Tui(_)) {
        crate::logging::init_cli_logger(cli.global.verbose);
    }

    match cli.command {
        Command::Tui(args) => handle_tui(args, settings, cli.global.verbose),
        Command::Analyze(args) => handle_analyze(args, &settings),
        Command::Projections(args) => handle_projections(args, &settings),
        Command::Catalog => {
            print!("{}", crate::report::format_catalog());
            Ok(())
        }
        Command::Countries => handle_countries(&settings),
    }
}

/// Environment settings with command-line overrides applied on top.
pub fn settings_from_args(global: &GlobalArgs) -> Result<Settings, AppError> {
    let mut settings = Settings::from_env()?;
    if let Some(dir) = &global.data_dir {
        settings.data_dir = dir.clone();
    }
    if let Some(base) = &global.wb_api_base {
        settings.wb_api_base = base.trim_end_matches('/').to_string();
    }
    if let Some(month) = global.weo_month {
        settings.weo_target_month = month;
    }
    settings.validate()?;
    Ok(settings)
}

fn handle_tui(args: TuiArgs, settings: Settings, verbose: bool) -> Result<(), AppError> {
    let log_path = settings.data_dir.join("econ-dash.log");
    std::fs::create_dir_all(&settings.data_dir).map_err(|e| {
        AppError::usage(format!(
            "Failed to create data directory '{}': {e}",
            settings.data_dir.display()
        ))
    })?;
    crate::logging::init_file_logger(&log_path, verbose)?;

    let end = args.end.unwrap_or_else(current_year);
    let start = args.start.unwrap_or(MIN_YEAR);
    let range = checked_range(start, end)?;
    crate::tui::run(settings, range)
}

fn handle_analyze(args: AnalyzeArgs, settings: &Settings) -> Result<(), AppError> {
    let range = checked_range(args.start, args.end.unwrap_or_else(current_year))?;

    let client = WorldBankClient::from_settings(settings)?;
    let all = client.countries()?;
    let countries = pipeline::resolve_countries(&all, &args.countries)?;

    info!(countries = countries.len(), start = range.start, end = range.end, "analysis requested");
    let output = pipeline::run_analysis(&client, &countries, range)?;

    eprint!("{}", crate::report::format_notices(&output.notices));
    println!("{}", crate::report::format_analysis(&output));

    if args.plot {
        for panel in output.sections.iter().flat_map(|s| &s.panels) {
            for plot in panel_plots(panel, args.width, args.height) {
                println!("{}\n{plot}", panel.title);
            }
        }
    }

    if let Some(path) = &args.export {
        crate::io::export::write_tidy_csv(path, &output.tidy)?;
        info!(path = %path.display(), "tidy table exported");
    }

    Ok(())
}

fn handle_projections(args: ProjectionsArgs, settings: &Settings) -> Result<(), AppError> {
    let year = args.year.unwrap_or_else(current_year);
    let downloader = HttpWeoDownloader::from_settings(settings)?;
    let loaded = pipeline::load_latest_release(
        &downloader,
        year,
        settings.weo_target_month,
        &settings.data_dir,
    )?;
    let projections = pipeline::country_projections(&loaded.dataset, &args.country)?;

    eprint!("{}", crate::report::format_notices(&loaded.notices));
    println!("{}", crate::report::format_projections(&projections, &loaded.release));

    if args.plot {
        for plot in projection_plots(&projections, current_year()) {
            println!("{plot}");
        }
    }

    if let Some(path) = &args.export {
        crate::io::export::write_projections_csv(path, &projections)?;
        info!(path = %path.display(), "projections exported");
    }

    Ok(())
}

fn handle_countries(settings: &Settings) -> Result<(), AppError> {
    let client = WorldBankClient::from_settings(settings)?;
    let countries = client.countries()?;
    print!("{}", crate::report::format_countries(&countries));
    Ok(())
}

fn checked_range(start: i32, end: i32) -> Result<YearRange, AppError> {
    if start < MIN_YEAR {
        return Err(AppError::usage(format!("Start year must be {MIN_YEAR} or later (got {start}).")));
    }
    YearRange::new(start, end)
}

/// ASCII plots for one panel (population panels get one plot per axis).
pub fn panel_plots(panel: &ChartPanel, width: usize, height: usize) -> Vec<String> {
    match &panel.body {
        PanelBody::Chart(chart) => {
            let series = plot_series(&chart.series, chart.kind);
            vec![render_series_plot(
                &series,
                Some(x_bounds(chart.x_range)),
                ReferenceLines::default(),
                width,
                height,
            )]
        }
        PanelBody::Population(chart) => {
            let x = Some(x_bounds(chart.x_range));
            vec![
                render_series_plot(
                    &plot_series(&chart.totals, ChartKind::Bar),
                    x,
                    ReferenceLines::default(),
                    width,
                    height,
                ),
                render_series_plot(
                    &plot_series(&chart.growth, ChartKind::Line),
                    x,
                    ReferenceLines { x: None, y: Some(0.0) },
                    width,
                    height,
                ),
            ]
        }
        PanelBody::NoData | PanelBody::MissingCompanion { .. } => Vec::new(),
    }
}

/// One ASCII plot per projection series, marking the current year and zero.
pub fn projection_plots(projections: &Projections, marker_year: i32) -> Vec<String> {
    ProjectionKind::ALL
        .iter()
        .map(|&kind| {
            let points: Vec<(f64, f64)> = projections
                .get(kind)
                .iter()
                .map(|(y, v)| (f64::from(y), v))
                .collect();
            let series = [PlotSeries {
                label: kind.key(),
                segments: vec![points],
            }];
            let refs = ReferenceLines {
                x: Some(f64::from(marker_year)),
                y: Some(0.0),
            };
            format!("{}\n{}", kind.title(), render_series_plot(&series, None, refs, 60, 10))
        })
        .collect()
}

fn plot_series(series: &[CountrySeries], kind: ChartKind) -> Vec<PlotSeries<'_>> {
    series
        .iter()
        .map(|s| {
            let segments = match kind {
                ChartKind::Line => s
                    .segments()
                    .into_iter()
                    .map(|seg| seg.into_iter().map(|(y, v)| (f64::from(y), v)).collect())
                    .collect(),
                // Bars have no connecting line; each value stands alone.
                ChartKind::Bar => s.present().map(|(y, v)| vec![(f64::from(y), v)]).collect(),
            };
            PlotSeries {
                label: &s.country,
                segments,
            }
        })
        .collect()
}

fn x_bounds((lo, hi): (i32, i32)) -> (f64, f64) {
    if hi > lo {
        (f64::from(lo), f64::from(hi))
    } else {
        (f64::from(lo) - 0.5, f64::from(hi) + 0.5)
    }
}

/// Rewrite argv so `econ` defaults to `econ tui`.
///
/// Rules:
/// - `econ`                       -> `econ tui`
/// - `econ --start 2000 ...`      -> `econ tui --start 2000 ...`
/// - `econ --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Global flags may come before the subcommand; skip them (and their values).
    let mut pos = 1;
    while let Some(arg) = argv.get(pos) {
        if GLOBAL_VALUE_FLAGS.contains(&arg.as_str()) {
            pos += 2;
        } else if arg == "-v"
            || arg == "--verbose"
            || GLOBAL_VALUE_FLAGS.iter().any(|f| arg.starts_with(&format!("{f}=")))
        {
            pos += 1;
        } else {
            break;
        }
    }

    let Some(first) = argv.get(pos) else {
        let at = pos.min(argv.len());
        argv.insert(at, "tui".to_string());
        return argv;
    };

    let keep = matches!(
        first.as_str(),
        "-h"
            | "--help"
            | "-V"
            | "--version"
            | "help"
            | "tui"
            | "analyze"
            | "projections"
            | "catalog"
            | "countries"
    );
    if keep {
        return argv;
    }

    // Anything else is treated as "tui flags".
    if first.starts_with('-') {
        argv.insert(pos, "tui".to_string());
    }
    argv
}

/// Global options that take a separate value.
const GLOBAL_VALUE_FLAGS: [&str; 3] = ["--data-dir", "--wb-api-base", "--weo-month"];
