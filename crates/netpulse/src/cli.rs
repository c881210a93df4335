//! Command-line definition for the `netpulse` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use netpulse_store::AggregationWindow;

#[derive(Debug, Parser)]
#[command(
    name = "netpulse",
    version,
    about = "Lightweight network traffic monitoring",
    long_about = "Polls host network-interface counters on a fixed interval, computes \
                  rollover-safe per-interval deltas, and stores them in SQLite for later querying."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the SQLite database
    #[arg(
        long,
        global = true,
        env = "NETPULSE_DB",
        default_value = "netpulse.db",
        value_name = "PATH"
    )]
    pub db: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the collector on its polling interval until interrupted
    Run(RunArgs),

    /// Trigger a single manual collection cycle
    Collect,

    /// Show collector configuration and database statistics
    Status,

    /// List host network interfaces and their counters
    Interfaces,

    /// Auto-detect the primary interface and seed initial configuration
    Detect(DetectArgs),

    /// Read or write collector configuration values
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Query stored traffic data
    History(HistoryArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Override the configured polling interval (e.g. 30s, 2m)
    #[arg(long, value_parser = humantime::parse_duration, value_name = "DURATION")]
    pub interval: Option<Duration>,

    /// Run primary-interface auto-detection first if it never completed
    #[arg(long)]
    pub detect: bool,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Snapshots taken across the detection window
    #[arg(long, default_value_t = 10)]
    pub samples: u32,

    /// Delay between snapshots (e.g. 1s, 500ms)
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s", value_name = "DURATION")]
    pub sample_interval: Duration,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Read one configuration value
    Get { key: String },

    /// Set one configuration value
    Set { key: String, value: String },

    /// Seed default collector configuration for unset keys
    Init,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Restrict to one interface
    #[arg(long, value_name = "NAME")]
    pub interface: Option<String>,

    /// Lookback window for aggregated output (1h, 6h, 24h, 7d, 30d)
    #[arg(long, default_value = "24h")]
    pub window: AggregationWindow,

    /// Number of aggregated data points
    #[arg(long, default_value_t = 50)]
    pub points: u32,

    /// Print raw rows instead of aggregated buckets
    #[arg(long)]
    pub raw: bool,

    /// Maximum raw rows (with --raw)
    #[arg(long, default_value_t = 100)]
    pub limit: i64,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
