//! CLI error types with miette diagnostics.
//!
//! Maps collector and storage errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use netpulse_core::{CollectorError, ConfigError};
use netpulse_store::StoreError;

/// Exit codes for the `netpulse` binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const DATABASE: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const LIFECYCLE: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Storage ──────────────────────────────────────────────────────
    #[error("Database operation failed")]
    #[diagnostic(
        code(netpulse::database),
        help(
            "Check that the database path is readable and writable.\n\
             The path comes from --db or NETPULSE_DB (default: ./netpulse.db)."
        )
    )]
    Database {
        #[source]
        source: StoreError,
    },

    // ── Collector lifecycle ──────────────────────────────────────────
    #[error("Collector error")]
    #[diagnostic(
        code(netpulse::collector),
        help("See the underlying error for what went wrong.")
    )]
    Collector {
        #[source]
        source: CollectorError,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration key '{key}' is not set")]
    #[diagnostic(
        code(netpulse::config_key_missing),
        help("Set it with: netpulse config set {key} <value>")
    )]
    ConfigKeyMissing { key: String },

    // ── Plumbing ─────────────────────────────────────────────────────
    #[error("Failed to render output")]
    #[diagnostic(code(netpulse::render))]
    Render(#[from] serde_json::Error),

    #[error("I/O error")]
    #[diagnostic(code(netpulse::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Database { .. } => exit_code::DATABASE,
            Self::Collector { source } => match source {
                CollectorError::AlreadyRunning | CollectorError::SchedulerInit { .. } => {
                    exit_code::LIFECYCLE
                }
                _ => exit_code::GENERAL,
            },
            Self::ConfigKeyMissing { .. } => exit_code::NOT_FOUND,
            Self::Render(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(source: StoreError) -> Self {
        Self::Database { source }
    }
}

impl From<CollectorError> for CliError {
    fn from(source: CollectorError) -> Self {
        Self::Collector { source }
    }
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        Self::Collector {
            source: CollectorError::Config(source),
        }
    }
}
