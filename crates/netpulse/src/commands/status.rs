//! `netpulse status` -- configuration and database statistics.
//!
//! Statistics are in-memory per collector instance, so from a separate
//! process this shows a stopped-state snapshot alongside the persistent
//! configuration and database counters.

use serde::Serialize;

use netpulse_core::{CollectorSettings, CollectorStatus, SystemSnapshotSource};
use netpulse_store::DatabaseStats;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::render_single;

use super::{build_collector, open_database};

#[derive(Debug, Serialize)]
struct StatusReport {
    collector: CollectorStatus,
    database: DatabaseStats,
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let db = open_database(global).await?;
    let settings = CollectorSettings::load(&db).await;
    let collector = build_collector(SystemSnapshotSource::new(), &db, settings);

    let report = StatusReport {
        collector: collector.status().await,
        database: db.database_stats().await?,
    };

    let rendered = render_single(global.output, &report, |r| {
        let mut lines = vec![
            format!("Running: {}", r.collector.is_running),
            format!("Tracked interfaces: {}", r.collector.previous_state_count),
            String::from("Configuration:"),
        ];
        for (key, value) in &r.collector.configuration {
            lines.push(format!(
                "  {key} = {}",
                value.as_deref().unwrap_or("<unset>")
            ));
        }
        lines.push(format!(
            "Database: {} traffic rows, {} config rows, {} bytes at {}",
            r.database.traffic_data_records,
            r.database.configuration_records,
            r.database.database_size_bytes,
            r.database.database_path,
        ));
        lines.join("\n")
    })?;
    println!("{rendered}");
    Ok(())
}
