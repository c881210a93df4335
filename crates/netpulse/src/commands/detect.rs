//! `netpulse detect` -- one-shot primary-interface auto-detection.

use netpulse_core::SystemSnapshotSource;
use netpulse_core::autodetect::{AutodetectSettings, populate_initial_config};

use crate::cli::{DetectArgs, GlobalOpts};
use crate::error::CliError;

use super::open_database;

pub async fn handle(args: DetectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let db = open_database(global).await?;
    let source = SystemSnapshotSource::new();

    let settings = AutodetectSettings {
        samples: args.samples.max(2),
        sample_interval: args.sample_interval,
        ..AutodetectSettings::default()
    };
    let window = settings.sample_interval * (settings.samples - 1);
    println!(
        "Monitoring traffic for ~{} to identify the primary interface...",
        humantime::format_duration(window)
    );

    let primary = populate_initial_config(&source, &db, &settings).await?;

    match primary {
        Some(name) => println!("Primary interface: {name}"),
        None => println!("No primary interface identified; collector will monitor all interfaces."),
    }
    Ok(())
}
