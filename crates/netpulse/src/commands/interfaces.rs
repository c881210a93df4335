//! `netpulse interfaces` -- enumerate host interfaces with counters.

use bytesize::ByteSize;
use tabled::Tabled;

use netpulse_net::{InterfaceDetails, SystemNetwork};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::render_list;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "INTERFACE")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "ADDRESSES")]
    addresses: String,
    #[tabled(rename = "RX")]
    rx: String,
    #[tabled(rename = "TX")]
    tx: String,
    #[tabled(rename = "PACKETS")]
    packets: String,
}

fn to_row(details: &InterfaceDetails) -> InterfaceRow {
    InterfaceRow {
        name: details.name.clone(),
        mac: details.mac_address.clone(),
        addresses: if details.ip_networks.is_empty() {
            "-".into()
        } else {
            details.ip_networks.join(", ")
        },
        rx: ByteSize(details.rx_bytes).to_string(),
        tx: ByteSize(details.tx_bytes).to_string(),
        packets: format!("{}/{}", details.rx_packets, details.tx_packets),
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let interfaces = SystemNetwork::new().interfaces();

    if interfaces.is_empty() {
        println!("No network interfaces found.");
        return Ok(());
    }

    let rendered = render_list(global.output, &interfaces, to_row)?;
    println!("{rendered}");
    Ok(())
}
