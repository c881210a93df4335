//! `netpulse run` -- start the scheduler and collect until interrupted.

use netpulse_core::autodetect::{AutodetectSettings, populate_initial_config};
use netpulse_core::{CollectorSettings, SystemSnapshotSource, initialize_config, keys};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;

use super::{build_collector, open_database};

pub async fn handle(args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let db = open_database(global).await?;
    initialize_config(&db).await?;

    let source = SystemSnapshotSource::new();

    if args.detect {
        let completed = db.config_value(keys::AUTO_DETECTION_COMPLETED).await?;
        if completed.is_none() {
            println!("Running first-time interface auto-detection...");
            let primary =
                populate_initial_config(&source, &db, &AutodetectSettings::default()).await?;
            match primary {
                Some(ref name) => println!("Primary interface: {name}"),
                None => println!("No primary interface identified; monitoring all interfaces."),
            }
        }
    }

    let settings = CollectorSettings::load(&db).await;
    let interval = args.interval.unwrap_or(settings.polling_interval);

    let collector = build_collector(source, &db, settings);
    collector.start(interval).await?;

    println!(
        "Collecting every {}; press Ctrl-C to stop.",
        humantime::format_duration(interval)
    );
    tokio::signal::ctrl_c().await?;

    println!("Stopping collector...");
    collector.stop().await;

    let snapshot = collector.statistics().await;
    println!(
        "Done: {} cycles ({} ok, {} failed) over {:.0}s.",
        snapshot.stats.total_polls,
        snapshot.stats.successful_polls,
        snapshot.stats.failed_polls,
        snapshot.uptime_seconds,
    );
    Ok(())
}
