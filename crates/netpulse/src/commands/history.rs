//! `netpulse history` -- query stored traffic data.

use bytesize::ByteSize;
use tabled::Tabled;

use netpulse_store::{AggregatedPoint, HistoryFilter, StoredTrafficRecord};

use crate::cli::{GlobalOpts, HistoryArgs};
use crate::error::CliError;
use crate::output::render_list;

use super::open_database;

#[derive(Tabled)]
struct AggregatedRow {
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "INTERFACE")]
    interface: String,
    #[tabled(rename = "AVG RX")]
    rx: String,
    #[tabled(rename = "AVG TX")]
    tx: String,
    #[tabled(rename = "AVG PACKETS")]
    packets: String,
}

#[derive(Tabled)]
struct RawRow {
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "INTERFACE")]
    interface: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
    #[tabled(rename = "PACKETS")]
    packets: String,
    #[tabled(rename = "INTERVAL")]
    interval: String,
}

fn aggregated_row(point: &AggregatedPoint) -> AggregatedRow {
    AggregatedRow {
        time: point.timestamp.to_rfc3339(),
        interface: point.interface_name.clone(),
        rx: ByteSize(point.rx_bytes.max(0) as u64).to_string(),
        tx: ByteSize(point.tx_bytes.max(0) as u64).to_string(),
        packets: format!("{}/{}", point.rx_packets, point.tx_packets),
    }
}

fn raw_row(record: &StoredTrafficRecord) -> RawRow {
    RawRow {
        time: record.timestamp.to_rfc3339(),
        interface: record.interface_name.clone(),
        rx: ByteSize(record.rx_bytes.max(0) as u64).to_string(),
        tx: ByteSize(record.tx_bytes.max(0) as u64).to_string(),
        packets: format!("{}/{}", record.rx_packets, record.tx_packets),
        interval: if record.collection_interval_seconds == 0.0 {
            "baseline".into()
        } else {
            format!("{:.1}s", record.collection_interval_seconds)
        },
    }
}

pub async fn handle(args: HistoryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let db = open_database(global).await?;

    if args.raw {
        let filter = HistoryFilter {
            interface: args.interface,
            limit: Some(args.limit),
            ..HistoryFilter::default()
        };
        let records = db.traffic_history(&filter).await?;
        if records.is_empty() {
            println!("No traffic records.");
            return Ok(());
        }
        let rendered = render_list(global.output, &records, raw_row)?;
        println!("{rendered}");
        return Ok(());
    }

    let points = db
        .aggregated_traffic(args.window, args.points, args.interface.as_deref())
        .await?;
    if points.is_empty() {
        println!("No traffic records in the last {}.", args.window);
        return Ok(());
    }
    let rendered = render_list(global.output, &points, aggregated_row)?;
    println!("{rendered}");
    Ok(())
}
