// In-memory collaborator fakes shared by the crate's unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use netpulse_net::InterfaceSnapshot;

use crate::error::{ConfigError, SinkError, SourceError};
use crate::model::TrafficDeltaRecord;
use crate::traits::{ConfigStore, SnapshotSource, TrafficSink};

// ── Snapshot source ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub(crate) struct FakeSource {
    state: Arc<Mutex<FakeSourceState>>,
    active_fetches: Arc<AtomicUsize>,
    max_active_fetches: Arc<AtomicUsize>,
}

#[derive(Default)]
struct FakeSourceState {
    snapshots: HashMap<String, InterfaceSnapshot>,
    failing: HashSet<String>,
    /// Interfaces that pass the liveness check but vanish by fetch time.
    phantom: HashSet<String>,
    fail_all: bool,
    fetch_delay: Option<Duration>,
}

impl FakeSource {
    pub fn set_counters(
        &self,
        interface: &str,
        rx_bytes: u64,
        tx_bytes: u64,
        rx_packets: u64,
        tx_packets: u64,
        captured_at: DateTime<Utc>,
    ) {
        self.state.lock().unwrap().snapshots.insert(
            interface.to_owned(),
            InterfaceSnapshot {
                interface_name: interface.to_owned(),
                rx_bytes,
                tx_bytes,
                rx_packets,
                tx_packets,
                captured_at,
            },
        );
    }

    pub fn set_phantom(&self, interface: &str) {
        self.state
            .lock()
            .unwrap()
            .phantom
            .insert(interface.to_owned());
    }

    pub fn set_failing(&self, interface: &str, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.failing.insert(interface.to_owned());
        } else {
            state.failing.remove(interface);
        }
    }

    pub fn set_fail_all(&self, fail_all: bool) {
        self.state.lock().unwrap().fail_all = fail_all;
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state.lock().unwrap().fetch_delay = Some(delay);
    }

    /// Highest number of snapshot fetches observed in flight at once.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_active_fetches.load(Ordering::SeqCst)
    }

    fn fetch_one(&self, interface: &str) -> Result<InterfaceSnapshot, SourceError> {
        let state = self.state.lock().unwrap();
        if state.fail_all || state.failing.contains(interface) {
            return Err(SourceError::Unavailable {
                message: format!("injected failure for {interface}"),
            });
        }
        state
            .snapshots
            .get(interface)
            .cloned()
            .ok_or_else(|| SourceError::InterfaceNotFound {
                interface: interface.to_owned(),
            })
    }
}

impl SnapshotSource for FakeSource {
    async fn snapshot(&self, interface: &str) -> Result<InterfaceSnapshot, SourceError> {
        let delay = self.state.lock().unwrap().fetch_delay;

        let active = self.active_fetches.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_fetches.fetch_max(active, Ordering::SeqCst);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.fetch_one(interface);

        self.active_fetches.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn snapshot_all(&self) -> Result<HashMap<String, InterfaceSnapshot>, SourceError> {
        let state = self.state.lock().unwrap();
        if state.fail_all {
            return Err(SourceError::Unavailable {
                message: "snapshot source unreachable".into(),
            });
        }
        Ok(state.snapshots.clone())
    }

    async fn is_known(&self, interface: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.snapshots.contains_key(interface) || state.phantom.contains(interface)
    }
}

// ── Configuration store ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub(crate) struct MemoryConfig {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl ConfigStore for MemoryConfig {
    async fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// ── Traffic sink ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub(crate) struct FakeSink {
    state: Arc<Mutex<FakeSinkState>>,
}

#[derive(Default)]
struct FakeSinkState {
    records: Vec<TrafficDeltaRecord>,
    fail_remaining: u32,
    fail_always: bool,
}

impl FakeSink {
    pub fn records(&self) -> Vec<TrafficDeltaRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Reject the next `n` inserts, then recover.
    pub fn fail_next(&self, n: u32) {
        self.state.lock().unwrap().fail_remaining = n;
    }

    pub fn set_fail_always(&self, fail_always: bool) {
        self.state.lock().unwrap().fail_always = fail_always;
    }
}

impl TrafficSink for FakeSink {
    async fn insert(&self, record: &TrafficDeltaRecord) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_always {
            return Err(SinkError {
                message: "sink unavailable".into(),
            });
        }
        if state.fail_remaining > 0 {
            state.fail_remaining -= 1;
            return Err(SinkError {
                message: "transient sink failure".into(),
            });
        }
        state.records.push(record.clone());
        Ok(())
    }
}
