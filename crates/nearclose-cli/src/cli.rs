//! CLI argument definitions for nearclose.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `check` | Compare a ticker's closes and current price with a target |
//! | `export` | Write the raw five-year history to a spreadsheet |
//! | `serve` | Run the web form |
//!
//! # Global Options
//!
//! | Option | Env | Default | Description |
//! |--------|-----|---------|-------------|
//! | `--format` | | `table` | Output format (table, json) |
//! | `--pretty` | | `false` | Pretty-print JSON output |
//! | `--source` | `NEARCLOSE_SOURCE` | `yahoo` | Market data source |
//! | `--timeout-ms` | `NEARCLOSE_TIMEOUT_MS` | `10000` | Per-attempt upstream timeout |
//! | `--retries` | `NEARCLOSE_RETRIES` | `1` | Retries of transient upstream failures |
//! | `--as-of` | | now | RFC 3339 UTC end of the history window |
//!
//! # Examples
//!
//! ```bash
//! nearclose check BOVA11.SA 118.40
//! nearclose check PETR4.SA 38,50 --format json --pretty --export petr4.csv
//! nearclose --source fixture serve --bind 0.0.0.0:8080
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nearclose_core::{ProviderId, EXPORT_FILE_NAME};

/// Did a stock close near a target price in the last five years?
#[derive(Debug, Parser)]
#[command(
    name = "nearclose",
    author,
    version,
    about = "Check whether a stock closed near a target price in the last five years",
    long_about = "nearclose fetches five years of daily closes and the current price for a \
ticker, compares the current price with a target, and lists the sessions that closed within \
0.99 of it. When none did, it reports the closest close instead.\n\
\n\
Use 'nearclose <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Market data source.
    #[arg(long, global = true, env = "NEARCLOSE_SOURCE", value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Timeout for each upstream attempt in milliseconds.
    #[arg(long, global = true, env = "NEARCLOSE_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Retries of transient upstream failures (0 disables retrying).
    #[arg(
        long,
        global = true,
        env = "NEARCLOSE_RETRIES",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(0..=3)
    )]
    pub retries: u32,

    /// End of the history window as RFC 3339 UTC, e.g. 2024-01-08T00:00:00Z.
    #[arg(long, global = true)]
    pub as_of: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    Table,
    /// Single JSON object.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo Finance chart endpoint.
    Yahoo,
    /// Deterministic offline demo data.
    Fixture,
}

impl From<SourceSelector> for ProviderId {
    fn from(selector: SourceSelector) -> Self {
        match selector {
            SourceSelector::Yahoo => Self::Yahoo,
            SourceSelector::Fixture => Self::Fixture,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare closes and the current price with a target price.
    ///
    /// # Examples
    ///
    ///   nearclose check BOVA11.SA 118.40
    ///   nearclose check ITUB4.SA 32,10 --export itub4.csv
    Check(CheckArgs),

    /// Write the raw daily history to a spreadsheet file.
    ///
    /// # Examples
    ///
    ///   nearclose export BOVA11.SA
    ///   nearclose export VALE3.SA --output vale3.csv
    Export(ExportArgs),

    /// Serve the lookup form over HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Ticker in the provider's convention (e.g. BOVA11.SA).
    pub ticker: String,

    /// Target price; `.` or `,` as decimal separator.
    #[arg(allow_hyphen_values = true)]
    pub target_price: String,

    /// Also write the raw history to this spreadsheet file.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Ticker in the provider's convention (e.g. BOVA11.SA).
    pub ticker: String,

    /// Destination file.
    #[arg(long, short, default_value = EXPORT_FILE_NAME)]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "NEARCLOSE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
}
