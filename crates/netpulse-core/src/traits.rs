// ── Collaborator seams ──
//
// The collector is generic over these three traits: where counters come
// from, where configuration lives, and where delta records go. The
// concrete host/database adapters are in `sources`; tests plug in
// in-memory fakes.

use std::collections::HashMap;
use std::future::Future;

use netpulse_net::InterfaceSnapshot;

use crate::error::{ConfigError, SinkError, SourceError};
use crate::model::TrafficDeltaRecord;

/// Supplies raw per-interface counter snapshots.
pub trait SnapshotSource: Send + Sync + 'static {
    /// Fetch a fresh snapshot for one interface. Fails explicitly if
    /// the interface is unknown or inaccessible.
    fn snapshot(
        &self,
        interface: &str,
    ) -> impl Future<Output = Result<InterfaceSnapshot, SourceError>> + Send;

    /// Snapshots for every interface the source currently reports.
    fn snapshot_all(
        &self,
    ) -> impl Future<Output = Result<HashMap<String, InterfaceSnapshot>, SourceError>> + Send;

    /// Liveness check used to validate configured interface names.
    fn is_known(&self, interface: &str) -> impl Future<Output = bool> + Send;
}

/// Key/value string store for collector configuration.
///
/// Reads happen fresh on every cycle (configuration can change between
/// cycles); the collector writes only through explicit setup calls.
pub trait ConfigStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, ConfigError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), ConfigError>> + Send;
}

/// Accepts one traffic-delta record at a time.
pub trait TrafficSink: Send + Sync + 'static {
    fn insert(
        &self,
        record: &TrafficDeltaRecord,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}
