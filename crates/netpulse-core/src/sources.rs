// ── Concrete collaborator adapters ──
//
// Wires the leaf crates into the collector's traits: `netpulse-net`
// supplies snapshots, `netpulse-store` plays both the configuration
// store and the traffic sink.

use std::collections::HashMap;

use tokio::sync::Mutex;

use netpulse_net::{InterfaceSnapshot, SystemNetwork};
use netpulse_store::{Database, NewTrafficRecord};

use crate::error::{ConfigError, SinkError, SourceError};
use crate::model::TrafficDeltaRecord;
use crate::traits::{ConfigStore, SnapshotSource, TrafficSink};

/// [`SnapshotSource`] over the host's real interface counters.
///
/// `SystemNetwork` refreshes on every read and therefore needs `&mut`;
/// a lock makes it shareable between the scheduler and manual cycles.
pub struct SystemSnapshotSource {
    network: Mutex<SystemNetwork>,
}

impl SystemSnapshotSource {
    pub fn new() -> Self {
        Self::from_network(SystemNetwork::new())
    }

    pub fn from_network(network: SystemNetwork) -> Self {
        Self {
            network: Mutex::new(network),
        }
    }
}

impl Default for SystemSnapshotSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for SystemSnapshotSource {
    async fn snapshot(&self, interface: &str) -> Result<InterfaceSnapshot, SourceError> {
        self.network
            .lock()
            .await
            .snapshot(interface)
            .map_err(Into::into)
    }

    async fn snapshot_all(&self) -> Result<HashMap<String, InterfaceSnapshot>, SourceError> {
        Ok(self.network.lock().await.snapshot_all())
    }

    async fn is_known(&self, interface: &str) -> bool {
        self.network.lock().await.is_known(interface)
    }
}

// ── Database adapters ───────────────────────────────────────────────

impl ConfigStore for Database {
    async fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.config_value(key).await.map_err(Into::into)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_config_value(key, value).await.map_err(Into::into)
    }
}

impl TrafficSink for Database {
    async fn insert(&self, record: &TrafficDeltaRecord) -> Result<(), SinkError> {
        let row = NewTrafficRecord {
            timestamp: record.timestamp,
            interface_name: record.interface_name.clone(),
            rx_bytes: counter_to_db(record.rx_bytes),
            tx_bytes: counter_to_db(record.tx_bytes),
            rx_packets: counter_to_db(record.rx_packets),
            tx_packets: counter_to_db(record.tx_packets),
            collection_interval_seconds: record.collection_interval_seconds,
        };
        self.insert_traffic_record(&row).await.map(drop).map_err(Into::into)
    }
}

/// SQLite integers are signed 64-bit; a counter beyond `i64::MAX` is
/// clamped rather than stored as a negative value.
fn counter_to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
