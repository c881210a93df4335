//! Command handlers and shared wiring.
//!
//! Exactly one collector per process: commands that need one construct
//! it here and pass it down -- there is no hidden global instance.

pub mod collect;
pub mod config_cmd;
pub mod detect;
pub mod history;
pub mod interfaces;
pub mod run;
pub mod status;

use netpulse_core::{Collector, CollectorSettings, SystemSnapshotSource};
use netpulse_store::Database;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The fully wired collector: host counters in, SQLite out.
pub type AppCollector = Collector<SystemSnapshotSource, Database, Database>;

pub async fn dispatch(command: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Run(args) => run::handle(args, global).await,
        Command::Collect => collect::handle(global).await,
        Command::Status => status::handle(global).await,
        Command::Interfaces => interfaces::handle(global),
        Command::Detect(args) => detect::handle(args, global).await,
        Command::Config(cmd) => config_cmd::handle(cmd, global).await,
        Command::History(args) => history::handle(args, global).await,
        Command::Completions(_) => unreachable!("handled before dispatch"),
    }
}

pub async fn open_database(global: &GlobalOpts) -> Result<Database, CliError> {
    Ok(Database::connect(&global.db).await?)
}

/// Wire a collector over the given database with the given source.
pub fn build_collector(
    source: SystemSnapshotSource,
    db: &Database,
    settings: CollectorSettings,
) -> AppCollector {
    Collector::with_settings(source, db.clone(), db.clone(), settings)
}
