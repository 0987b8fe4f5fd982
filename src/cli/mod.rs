//! Command-line parsing for the sales forecast dashboard.
//!
//! Argument parsing stays separate from command dispatch (`app`) and from the
//! engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sf", version, about = "Sales forecast dashboard (timeframe selection + daily resampling)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List product identifiers in store order.
    Products(SourceArgs),
    /// Print trend, anomalies, chart table and plot for one product.
    Show(ShowArgs),
    /// Plot a previously exported dashboard JSON.
    Plot(PlotArgs),
    /// Print the active timeframe table.
    Timeframes(TimeframeArgs),
    /// Write the synthetic sample catalog as a results file.
    Generate(GenerateArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same pipeline as `sf show`, rendered with Ratatui.
    Tui(TuiArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// HTTP if an API URL is set, else the results file if present, else the sample.
    Auto,
    File,
    Http,
    Sample,
}

/// Where product data comes from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    #[arg(long, value_enum, default_value_t = SourceKind::Auto)]
    pub source: SourceKind,

    /// Results JSON file (object keyed by product id).
    #[arg(long, env = "SF_DATA_PATH", value_name = "JSON")]
    pub data: Option<PathBuf>,

    /// Product API base URL.
    #[arg(long, env = "SF_API_URL", value_name = "URL")]
    pub api: Option<String>,

    /// Seed for the synthetic sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skip Sundays in the synthetic sample (calendar gaps).
    #[arg(long)]
    pub sparse: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TimeframeArgs {
    /// Timeframe table JSON (defaults to 15D/30D/45D/60D/ALL).
    #[arg(long = "timeframes", value_name = "JSON")]
    pub timeframes: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub table: TimeframeArgs,

    /// Product id (defaults to the first product).
    #[arg(short = 'p', long)]
    pub product: Option<String>,

    /// Timeframe label or token name (e.g. `30D`, `short`). Defaults to the first entry.
    #[arg(short = 't', long)]
    pub timeframe: Option<String>,

    /// Render an ASCII plot (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Print the per-day chart table.
    #[arg(long)]
    pub table_rows: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export chart rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the dashboard to JSON.
    #[arg(long = "export-view", value_name = "JSON")]
    pub export_view: Option<PathBuf>,
}

/// Options for plotting a saved dashboard.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Dashboard JSON file produced by `sf show --export-view`.
    #[arg(long, value_name = "JSON")]
    pub view: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Output results file.
    #[arg(long, value_name = "JSON", default_value = crate::data::DEFAULT_RESULTS_PATH)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long)]
    pub sparse: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub table: TimeframeArgs,

    /// Write logs to this file (the terminal is owned by the UI).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_product_and_timeframe() {
        let cli = Cli::parse_from(["sf", "show", "-p", "ipad_pro_stock", "-t", "30d", "--source", "sample"]);
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.product.as_deref(), Some("ipad_pro_stock"));
                assert_eq!(args.timeframe.as_deref(), Some("30d"));
                assert_eq!(args.source.source, SourceKind::Sample);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn clap_model_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
