//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - picks the product data source
//! - runs the dashboard pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, GenerateArgs, PlotArgs, ShowArgs, SourceArgs, SourceKind, TimeframeArgs, TuiArgs};
use crate::data::{DEFAULT_RESULTS_PATH, HttpStore, JsonFileStore, ProductStore, SampleConfig, SampleStore};
use crate::engine::TimeframeTable;
use crate::error::{AppError, ForecastError};
use crate::logging::LogTarget;

pub mod fetch;
pub mod pipeline;
pub mod session;

/// Entry point for the `sf` binary.
pub fn run() -> Result<(), AppError> {
    // Before clap so `.env` values reach the `env = ...` arguments.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; it logs to a file or not at all.
    let log_target = match &cli.command {
        Command::Tui(TuiArgs { log_file: Some(path), .. }) => LogTarget::File(path.clone()),
        Command::Tui(_) => LogTarget::Off,
        _ => LogTarget::Stderr,
    };
    crate::logging::init(&log_target)?;

    match cli.command {
        Command::Products(args) => handle_products(args),
        Command::Show(args) => handle_show(args),
        Command::Plot(args) => handle_plot(args),
        Command::Timeframes(args) => handle_timeframes(args),
        Command::Generate(args) => handle_generate(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_products(args: SourceArgs) -> Result<(), AppError> {
    let store = build_store(&args)?;
    let products = store.list_products()?;
    if products.is_empty() {
        return Err(ForecastError::EmptyCatalog.into());
    }
    print!("{}", crate::report::format_products(&products));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let table = load_table(&args.table)?;
    // Unknown input is a usage error here; inside the pipeline it falls back to `all`.
    let token = match &args.timeframe {
        Some(input) => table.parse_token(input)?,
        None => table.default_token(),
    };

    let store = build_store(&args.source)?;
    let product = match &args.product {
        Some(p) => p.clone(),
        None => store
            .list_products()?
            .into_iter()
            .next()
            .ok_or(ForecastError::EmptyCatalog)?,
    };

    let series = store.get_series(&product)?;
    let view = pipeline::build_dashboard(&product, &series, &table, token);

    println!("{}", crate::report::format_dashboard(&view));
    if args.table_rows {
        println!("{}", crate::report::format_chart_table(&view.chart));
    }
    if args.plot && !args.no_plot {
        println!(
            "{}",
            crate::plot::render_ascii_chart(&view.chart, args.width, args.height)
        );
    }

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::write_chart_csv(path, &view.chart)?;
        info!(path = %path.display(), "wrote chart CSV");
    }
    if let Some(path) = &args.export_view {
        crate::io::write_view_json(path, &view)?;
        info!(path = %path.display(), "wrote dashboard JSON");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let view = crate::io::read_view_json(&args.view)?;
    println!("{}", crate::report::format_dashboard(&view));
    println!(
        "{}",
        crate::plot::render_ascii_chart(&view.chart, args.width, args.height)
    );
    Ok(())
}

fn handle_timeframes(args: TimeframeArgs) -> Result<(), AppError> {
    let table = load_table(&args)?;
    print!("{}", crate::report::format_timeframes(&table));
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let store = SampleStore::new(SampleConfig {
        seed: args.seed,
        sparse: args.sparse,
        ..SampleConfig::default()
    });
    let products = store.generate_all()?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", parent.display())))?;
    }
    crate::data::file::write_results(&args.out, &products)?;
    info!(path = %args.out.display(), products = products.len(), "wrote results file");
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let table = load_table(&args.table)?;
    let store = build_store(&args.source)?;
    crate::tui::run(store, table)
}

pub fn load_table(args: &TimeframeArgs) -> Result<TimeframeTable, AppError> {
    match &args.timeframes {
        Some(path) => TimeframeTable::load(path),
        None => Ok(TimeframeTable::default()),
    }
}

/// Pick the product store.
///
/// `auto`: HTTP when an API URL is configured, else the results file when a
/// path is given or the default file exists, else the synthetic sample.
pub fn build_store(args: &SourceArgs) -> Result<Arc<dyn ProductStore>, AppError> {
    let kind = match args.source {
        SourceKind::Auto if args.api.is_some() => SourceKind::Http,
        SourceKind::Auto if args.data.is_some() || Path::new(DEFAULT_RESULTS_PATH).exists() => SourceKind::File,
        SourceKind::Auto => SourceKind::Sample,
        other => other,
    };

    let store: Arc<dyn ProductStore> = match kind {
        SourceKind::Http => match &args.api {
            Some(url) => Arc::new(HttpStore::new(url)?),
            None => Arc::new(HttpStore::from_env()?),
        },
        SourceKind::File => Arc::new(JsonFileStore::new(
            args.data.clone().unwrap_or_else(|| DEFAULT_RESULTS_PATH.into()),
        )),
        SourceKind::Sample | SourceKind::Auto => Arc::new(SampleStore::new(SampleConfig {
            seed: args.seed,
            sparse: args.sparse,
            ..SampleConfig::default()
        })),
    };
    info!(source = store.name(), "using product store");
    Ok(store)
}

/// Rewrite argv so `sf` defaults to `sf tui`.
///
/// Rules:
/// - `sf`                      -> `sf tui`
/// - `sf --source sample ...`  -> `sf tui --source sample ...`
/// - `sf --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // A leading flag is treated as TUI flags; anything else is left to clap.
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(argv(&["sf"])), argv(&["sf", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["sf", "--source", "sample"])),
            argv(&["sf", "tui", "--source", "sample"])
        );
        assert_eq!(rewrite_args(argv(&["sf", "--help"])), argv(&["sf", "--help"]));
        assert_eq!(rewrite_args(argv(&["sf", "show", "-p", "x"])), argv(&["sf", "show", "-p", "x"]));
    }

    fn source(kind: SourceKind) -> SourceArgs {
        SourceArgs {
            source: kind,
            data: None,
            api: None,
            seed: 42,
            sparse: false,
        }
    }

    #[test]
    fn explicit_sources_are_honoured() {
        assert_eq!(build_store(&source(SourceKind::Sample)).unwrap().name(), "sample");
        assert_eq!(build_store(&source(SourceKind::File)).unwrap().name(), "file");

        let mut http = source(SourceKind::Auto);
        http.api = Some("http://127.0.0.1:9/".to_string());
        assert_eq!(build_store(&http).unwrap().name(), "http");

        let mut file = source(SourceKind::Auto);
        file.data = Some("results.json".into());
        assert_eq!(build_store(&file).unwrap().name(), "file");
    }
}
