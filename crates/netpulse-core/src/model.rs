// ── Collection data model ──

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::StatisticsSnapshot;

/// The unit written to the persistence sink: one interface's traffic
/// for one collection interval.
///
/// All four counter fields are non-negative deltas, except on the first
/// observation of an interface: a *baseline record* carries the raw
/// cumulative counters with `collection_interval_seconds == 0.0`, so
/// downstream consumers get a usable row before two samples exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficDeltaRecord {
    pub interface_name: String,
    /// Capture time of the *current* sample, not of the delta midpoint.
    pub timestamp: DateTime<Utc>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    /// Elapsed wall-clock seconds since the previous sample for this
    /// interface; `0.0` marks a baseline record.
    pub collection_interval_seconds: f64,
}

impl TrafficDeltaRecord {
    pub fn is_baseline(&self) -> bool {
        self.collection_interval_seconds == 0.0
    }
}

/// A per-interface fault encountered during one cycle.
///
/// Expected faults (interface vanished, counter read failed, sink
/// rejected the write) are isolated: they never abort the cycle or
/// propagate past it. Rendered as human-readable strings tagged with
/// the interface name, in encounter order.
#[derive(Debug, Clone, Error)]
pub enum CycleFault {
    #[error("Interface '{interface}' not found or not active")]
    InterfaceNotFound { interface: String },

    #[error("Failed to collect data for {interface}: {message}")]
    Snapshot { interface: String, message: String },

    #[error("Failed to store traffic data for {interface}: {message}")]
    Persistence { interface: String, message: String },

    #[error("Failed to resolve interfaces: {message}")]
    Resolution { message: String },
}

impl CycleFault {
    /// The interface this fault is tagged with, if it is interface-scoped.
    pub fn interface(&self) -> Option<&str> {
        match self {
            Self::InterfaceNotFound { interface }
            | Self::Snapshot { interface, .. }
            | Self::Persistence { interface, .. } => Some(interface),
            Self::Resolution { .. } => None,
        }
    }
}

impl Serialize for CycleFault {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of one orchestrator invocation.
///
/// `success` is true iff zero per-interface faults occurred. Constructed
/// fresh each cycle and discarded after being folded into statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionCycleResult {
    pub success: bool,
    pub data: HashMap<String, TrafficDeltaRecord>,
    pub errors: Vec<CycleFault>,
}

/// Summary returned by a manual [`collect_once`](crate::Collector::collect_once).
#[derive(Debug, Clone, Serialize)]
pub struct ManualCollection {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub interfaces_collected: usize,
    pub errors: Vec<CycleFault>,
    pub stats: StatisticsSnapshot,
}

/// Read-only composite view of the collector, safe to request at any
/// time, including concurrently with a running cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CollectorStatus {
    pub is_running: bool,
    pub stats: StatisticsSnapshot,
    /// Current values of the collector's configuration keys, read fresh
    /// from the configuration store (short key name -> value).
    pub configuration: BTreeMap<String, Option<String>>,
    /// Number of interfaces with remembered previous-cycle state. Stale
    /// entries for vanished interfaces are retained, so this can exceed
    /// the live interface count.
    pub previous_state_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_is_flagged_by_zero_interval() {
        let record = TrafficDeltaRecord {
            interface_name: "eth0".into(),
            timestamp: Utc::now(),
            rx_bytes: 1,
            tx_bytes: 2,
            rx_packets: 3,
            tx_packets: 4,
            collection_interval_seconds: 0.0,
        };
        assert!(record.is_baseline());
    }

    #[test]
    fn faults_render_with_interface_tag() {
        let fault = CycleFault::Snapshot {
            interface: "wlan0".into(),
            message: "permission denied".into(),
        };
        assert_eq!(fault.interface(), Some("wlan0"));
        let text = fault.to_string();
        assert!(text.contains("wlan0"));
        assert!(text.contains("permission denied"));
    }

    #[test]
    fn faults_serialize_as_plain_strings() {
        let fault = CycleFault::InterfaceNotFound {
            interface: "eth9".into(),
        };
        let json = serde_json::to_value(&fault).unwrap();
        assert_eq!(json, serde_json::json!("Interface 'eth9' not found or not active"));
    }
}
