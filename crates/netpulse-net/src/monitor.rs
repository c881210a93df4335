// ── Host counter source ──
//
// Wraps `sysinfo::Networks` behind a small API that the collector's
// `SnapshotSource` trait adapts to. Refreshing rebuilds the interface
// list so hot-plugged interfaces appear and removed ones disappear.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sysinfo::Networks;
use tracing::debug;

use crate::error::NetError;
use crate::snapshot::InterfaceSnapshot;

/// Live view of the host's network interfaces and their counters.
///
/// Methods take `&mut self` because every read refreshes the underlying
/// counter table; callers that need shared access wrap this in a lock.
pub struct SystemNetwork {
    networks: Networks,
}

/// Descriptive details for one interface, used by enumeration commands
/// and the auto-detection classifier.
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceDetails {
    pub name: String,
    pub mac_address: String,
    pub ip_networks: Vec<String>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
}

/// Aggregate traffic totals across all interfaces.
#[derive(Debug, Clone, Serialize)]
pub struct TrafficSummary {
    pub total_interfaces: usize,
    pub total_rx_bytes: u64,
    pub total_tx_bytes: u64,
    pub total_rx_packets: u64,
    pub total_tx_packets: u64,
}

impl SystemNetwork {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }

    /// Re-read the interface list and all counters from the OS.
    fn refresh(&mut self) {
        // Rebuilding (rather than refreshing in place) picks up
        // interfaces added or removed since the last poll.
        self.networks = Networks::new_with_refreshed_list();
    }

    /// Returns `true` if the interface currently exists on this host.
    pub fn is_known(&mut self, interface: &str) -> bool {
        self.refresh();
        self.networks
            .iter()
            .any(|(name, _)| name.as_str() == interface)
    }

    /// Names of all interfaces currently present.
    pub fn interface_names(&mut self) -> Vec<String> {
        self.refresh();
        let mut names: Vec<String> = self.networks.iter().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }

    /// Fetch a fresh counter snapshot for one interface.
    pub fn snapshot(&mut self, interface: &str) -> Result<InterfaceSnapshot, NetError> {
        self.refresh();
        let captured_at = Utc::now();

        let data = self
            .networks
            .iter()
            .find(|(name, _)| name.as_str() == interface)
            .map(|(_, data)| data)
            .ok_or_else(|| NetError::InterfaceNotFound {
                interface: interface.to_owned(),
            })?;

        Ok(InterfaceSnapshot {
            interface_name: interface.to_owned(),
            rx_bytes: data.total_received(),
            tx_bytes: data.total_transmitted(),
            rx_packets: data.total_packets_received(),
            tx_packets: data.total_packets_transmitted(),
            captured_at,
        })
    }

    /// Fetch counter snapshots for every interface in one refresh, so
    /// all entries share a single capture pass.
    pub fn snapshot_all(&mut self) -> HashMap<String, InterfaceSnapshot> {
        self.refresh();
        let captured_at = Utc::now();

        let snapshots: HashMap<String, InterfaceSnapshot> = self
            .networks
            .iter()
            .map(|(name, data)| {
                (
                    name.clone(),
                    InterfaceSnapshot {
                        interface_name: name.clone(),
                        rx_bytes: data.total_received(),
                        tx_bytes: data.total_transmitted(),
                        rx_packets: data.total_packets_received(),
                        tx_packets: data.total_packets_transmitted(),
                        captured_at,
                    },
                )
            })
            .collect();

        debug!(interfaces = snapshots.len(), "captured counter snapshots");
        snapshots
    }

    /// Enumerate interfaces with addresses and cumulative counters.
    pub fn interfaces(&mut self) -> Vec<InterfaceDetails> {
        self.refresh();

        let mut details: Vec<InterfaceDetails> = self
            .networks
            .iter()
            .map(|(name, data)| InterfaceDetails {
                name: name.clone(),
                mac_address: data.mac_address().to_string(),
                ip_networks: data.ip_networks().iter().map(ToString::to_string).collect(),
                rx_bytes: data.total_received(),
                tx_bytes: data.total_transmitted(),
                rx_packets: data.total_packets_received(),
                tx_packets: data.total_packets_transmitted(),
            })
            .collect();
        details.sort_by(|a, b| a.name.cmp(&b.name));
        details
    }

    /// Traffic totals across all interfaces.
    pub fn traffic_summary(&mut self) -> TrafficSummary {
        let snapshots = self.snapshot_all();

        let mut summary = TrafficSummary {
            total_interfaces: snapshots.len(),
            total_rx_bytes: 0,
            total_tx_bytes: 0,
            total_rx_packets: 0,
            total_tx_packets: 0,
        };

        for snapshot in snapshots.values() {
            summary.total_rx_bytes = summary.total_rx_bytes.saturating_add(snapshot.rx_bytes);
            summary.total_tx_bytes = summary.total_tx_bytes.saturating_add(snapshot.tx_bytes);
            summary.total_rx_packets = summary.total_rx_packets.saturating_add(snapshot.rx_packets);
            summary.total_tx_packets = summary.total_tx_packets.saturating_add(snapshot.tx_packets);
        }

        summary
    }
}

impl Default for SystemNetwork {
    fn default() -> Self {
        Self::new()
    }
}
