//! `netpulse collect` -- one manual collection cycle.

use netpulse_core::{CollectorSettings, SystemSnapshotSource};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::render_single;

use super::{build_collector, open_database};

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let db = open_database(global).await?;
    let settings = CollectorSettings::load(&db).await;
    let collector = build_collector(SystemSnapshotSource::new(), &db, settings);

    let result = collector.collect_once().await;

    let rendered = render_single(global.output, &result, |r| {
        let mut text = format!(
            "Collected {} interface(s) at {}.",
            r.interfaces_collected,
            r.timestamp.to_rfc3339()
        );
        if !r.errors.is_empty() {
            text.push_str(&format!("\n{} error(s):", r.errors.len()));
            for error in &r.errors {
                text.push_str(&format!("\n  - {error}"));
            }
        }
        text
    })?;
    println!("{rendered}");

    // A degraded cycle is still a completed collection: data for the
    // healthy interfaces was stored, so this is not a CLI failure.
    Ok(())
}
