// ── Collection cycle orchestrator and scheduler ──
//
// Full lifecycle for periodic counter collection: resolves the
// monitored interface set, fetches snapshots, turns them into
// rollover-safe deltas, persists them, and keeps statistics -- with a
// background ticker that never runs two scheduled cycles at once.
//
// Lock discipline: `previous` and `stats` share one mutex, held only
// for the in-memory read-modify-write. Snapshot fetches and sink
// writes always happen outside it, so a slow interface or database
// never serializes unrelated I/O.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use netpulse_net::InterfaceSnapshot;

use crate::config::{CollectorSettings, keys};
use crate::delta::counter_delta;
use crate::error::{CollectorError, SourceError};
use crate::model::{CollectionCycleResult, CollectorStatus, CycleFault, ManualCollection, TrafficDeltaRecord};
use crate::retry::retry;
use crate::stats::{CollectionStatistics, StatisticsSnapshot};
use crate::traits::{ConfigStore, SnapshotSource, TrafficSink};

/// Short name -> configuration-store key, for status reporting.
const CONFIG_KEYS: [(&str, &str); 5] = [
    ("monitored_interfaces", keys::MONITORED_INTERFACES),
    ("polling_interval", keys::POLLING_INTERVAL),
    ("max_retries", keys::MAX_RETRIES),
    ("retry_delay", keys::RETRY_DELAY),
    ("last_collection", keys::LAST_COLLECTION),
];

/// The collection engine.
///
/// One instance per process, constructed explicitly and injected into
/// whatever shell embeds it. Cheaply cloneable via `Arc`; clones share
/// all state, so a manual [`collect_once`](Self::collect_once) and a
/// scheduled cycle always see the same previous-state map.
pub struct Collector<S, C, K> {
    inner: Arc<Inner<S, C, K>>,
}

impl<S, C, K> Clone for Collector<S, C, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S, C, K> {
    source: S,
    config: C,
    sink: K,
    settings: CollectorSettings,
    state: Mutex<SharedState>,
    lifecycle: Mutex<Lifecycle>,
    run_state: watch::Sender<bool>,
}

#[derive(Default)]
struct SharedState {
    previous: HashMap<String, PreviousCounters>,
    stats: CollectionStatistics,
}

#[derive(Default)]
struct Lifecycle {
    cancel: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

/// Last-seen counters per interface. Entries are created on first
/// sight and updated on every successfully sampled cycle; interfaces
/// that vanish simply stop being updated.
#[derive(Debug, Clone)]
struct PreviousCounters {
    rx_bytes: u64,
    tx_bytes: u64,
    rx_packets: u64,
    tx_packets: u64,
    timestamp: DateTime<Utc>,
}

impl From<&InterfaceSnapshot> for PreviousCounters {
    fn from(snapshot: &InterfaceSnapshot) -> Self {
        Self {
            rx_bytes: snapshot.rx_bytes,
            tx_bytes: snapshot.tx_bytes,
            rx_packets: snapshot.rx_packets,
            tx_packets: snapshot.tx_packets,
            timestamp: snapshot.captured_at,
        }
    }
}

enum SnapshotOutcome {
    /// First sight of this interface: raw counters, zero interval.
    Baseline(TrafficDeltaRecord),
    /// Normal case: per-interval deltas.
    Delta(TrafficDeltaRecord),
    /// Non-positive elapsed time (clock skew or sub-resolution repeat);
    /// a timing artifact, not a fault.
    Stale,
}

impl<S, C, K> Collector<S, C, K>
where
    S: SnapshotSource,
    C: ConfigStore,
    K: TrafficSink,
{
    pub fn new(source: S, config: C, sink: K) -> Self {
        Self::with_settings(source, config, sink, CollectorSettings::default())
    }

    pub fn with_settings(source: S, config: C, sink: K, settings: CollectorSettings) -> Self {
        let (run_state, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                sink,
                settings,
                state: Mutex::new(SharedState::default()),
                lifecycle: Mutex::new(Lifecycle::default()),
                run_state,
            }),
        }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.inner.settings
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start the background scheduler with the given cycle interval.
    ///
    /// Fails with [`CollectorError::AlreadyRunning`] while running. A
    /// tick that fires while the previous cycle is still executing is
    /// dropped, not queued, so at most one scheduled cycle is ever in
    /// flight.
    pub async fn start(&self, interval: Duration) -> Result<(), CollectorError> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if *self.inner.run_state.borrow() {
            return Err(CollectorError::AlreadyRunning);
        }
        if interval.is_zero() {
            return Err(CollectorError::SchedulerInit {
                message: "polling interval must be greater than zero".into(),
            });
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(self.clone(), interval, cancel.clone()));
        lifecycle.cancel = Some(cancel);
        lifecycle.handle = Some(handle);

        self.inner.state.lock().await.stats.start_time = Some(Utc::now());
        let _ = self.inner.run_state.send(true);
        info!(interval_secs = interval.as_secs_f64(), "collector started");
        Ok(())
    }

    /// Stop the background scheduler, waiting (bounded) for any
    /// in-flight cycle to finish.
    ///
    /// Idempotent: stopping an already-stopped collector is a no-op.
    /// Teardown problems are logged but never surface -- from the
    /// caller's perspective stop always succeeds.
    pub async fn stop(&self) {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if !*self.inner.run_state.borrow() {
            debug!("collector is not running; stop is a no-op");
            return;
        }

        if let Some(cancel) = lifecycle.cancel.take() {
            cancel.cancel();
        }
        if let Some(handle) = lifecycle.handle.take() {
            match tokio::time::timeout(self.inner.settings.stop_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "poll task ended abnormally"),
                Err(_) => warn!("timed out waiting for in-flight cycle; detaching poll task"),
            }
        }

        let _ = self.inner.run_state.send(false);
        info!("collector stopped");
    }

    pub fn is_running(&self) -> bool {
        *self.inner.run_state.borrow()
    }

    /// Observe running/stopped transitions.
    pub fn run_state(&self) -> watch::Receiver<bool> {
        self.inner.run_state.subscribe()
    }

    // ── Collection ───────────────────────────────────────────────────

    /// Execute exactly one collection cycle.
    ///
    /// Per-interface faults are isolated: one misbehaving interface
    /// never aborts the others. Statistics are updated exactly once per
    /// cycle on every path, including the resolution short-circuit.
    pub async fn collect(&self) -> CollectionCycleResult {
        let mut errors: Vec<CycleFault> = Vec::new();
        let mut data = HashMap::new();

        let interfaces = match self.resolve_interfaces().await {
            Ok(interfaces) => interfaces,
            Err(fault) => {
                warn!(error = %fault, "interface resolution failed; skipping cycle");
                errors.push(fault);
                self.finish_cycle(&errors).await;
                return CollectionCycleResult {
                    success: false,
                    data,
                    errors,
                };
            }
        };
        debug!(interfaces = interfaces.len(), "starting collection cycle");

        for interface in interfaces {
            let snapshot = match self.inner.source.snapshot(&interface).await {
                Ok(snapshot) => snapshot,
                Err(err @ SourceError::InterfaceNotFound { .. }) => {
                    debug!(interface, error = %err, "interface vanished during cycle");
                    errors.push(CycleFault::InterfaceNotFound { interface });
                    continue;
                }
                Err(err) => {
                    warn!(interface, error = %err, "snapshot fetch failed");
                    errors.push(CycleFault::Snapshot {
                        interface,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            // Read-modify-write of previous state under the lock; the
            // sink write below happens after it is released. Previous
            // state advances even when the write later fails, so a
            // flaky sink is never handed the same delta twice.
            let outcome = {
                let mut state = self.inner.state.lock().await;
                apply_snapshot(&mut state.previous, &snapshot)
            };

            let record = match outcome {
                SnapshotOutcome::Stale => {
                    debug!(
                        interface = %snapshot.interface_name,
                        "non-positive elapsed time; skipping sample"
                    );
                    continue;
                }
                SnapshotOutcome::Baseline(record) => {
                    debug!(interface = %record.interface_name, "first sight; storing baseline");
                    record
                }
                SnapshotOutcome::Delta(record) => record,
            };

            let write = retry(
                self.inner.settings.max_retries,
                self.inner.settings.retry_delay,
                || self.inner.sink.insert(&record),
            )
            .await;

            match write {
                Ok(()) => {
                    data.insert(record.interface_name.clone(), record);
                }
                Err(err) => {
                    warn!(
                        interface = %record.interface_name,
                        error = %err,
                        "failed to persist traffic record"
                    );
                    errors.push(CycleFault::Persistence {
                        interface: record.interface_name.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let success = errors.is_empty();
        if success {
            debug!(interfaces = data.len(), "collection cycle completed");
        } else {
            warn!(errors = errors.len(), "collection cycle had errors");
        }
        self.finish_cycle(&errors).await;

        CollectionCycleResult {
            success,
            data,
            errors,
        }
    }

    /// One manual cycle, wrapped with a timestamp and a statistics
    /// snapshot. Callable whether or not the scheduler is running and
    /// does not affect it.
    pub async fn collect_once(&self) -> ManualCollection {
        let result = self.collect().await;
        let stats = self.statistics().await;
        ManualCollection {
            success: result.success,
            timestamp: Utc::now(),
            interfaces_collected: result.data.len(),
            errors: result.errors,
            stats,
        }
    }

    /// Read-only composite view: running flag, statistics, current
    /// configuration, previous-state entry count.
    pub async fn status(&self) -> CollectorStatus {
        // Config reads go to the store fresh; do them before taking the
        // state lock so slow I/O never blocks a running cycle.
        let configuration = self.current_configuration().await;

        let (stats, previous_state_count) = {
            let state = self.inner.state.lock().await;
            (state.stats.snapshot(Utc::now()), state.previous.len())
        };

        CollectorStatus {
            is_running: self.is_running(),
            stats,
            configuration,
            previous_state_count,
        }
    }

    pub async fn statistics(&self) -> StatisticsSnapshot {
        self.inner.state.lock().await.stats.snapshot(Utc::now())
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Resolve the interface set for this cycle.
    ///
    /// Configured names are validated against the source and invalid
    /// ones discarded (logged, not errors). An empty result falls back
    /// to every interface the source currently reports; only that
    /// fallback can fail, short-circuiting the cycle.
    async fn resolve_interfaces(&self) -> Result<Vec<String>, CycleFault> {
        let configured = match self.inner.config.get(keys::MONITORED_INTERFACES).await {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "failed to read monitored interfaces; monitoring all");
                String::new()
            }
        };

        let mut resolved = Vec::new();
        for name in configured.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if self.inner.source.is_known(name).await {
                resolved.push(name.to_owned());
            } else {
                warn!(interface = name, "configured interface not found; skipping");
            }
        }
        if !resolved.is_empty() {
            return Ok(resolved);
        }

        let all = self
            .inner
            .source
            .snapshot_all()
            .await
            .map_err(|err| CycleFault::Resolution {
                message: err.to_string(),
            })?;
        let mut names: Vec<String> = all.into_keys().collect();
        names.sort();
        Ok(names)
    }

    /// Fold the finished cycle into statistics -- exactly once per
    /// cycle, on every path.
    async fn finish_cycle(&self, errors: &[CycleFault]) {
        let mut state = self.inner.state.lock().await;
        state.stats.record_cycle(errors.len(), Utc::now());
        state.stats.interfaces_monitored = state.previous.len();
    }

    /// Count a scheduled cycle that aborted before producing a result.
    async fn record_cycle_abort(&self) {
        self.inner.state.lock().await.stats.record_cycle_abort();
    }

    async fn current_configuration(&self) -> BTreeMap<String, Option<String>> {
        let mut configuration = BTreeMap::new();
        for (short, key) in CONFIG_KEYS {
            let value = self.inner.config.get(key).await.unwrap_or_default();
            configuration.insert(short.to_owned(), value);
        }
        configuration
    }
}

/// Turn a fresh snapshot into a record, updating previous state.
///
/// Runs entirely under the caller's state lock: the lookup, the delta
/// computation, and the previous-state update are one atomic step, so
/// a concurrent manual cycle can never double-apply an update.
fn apply_snapshot(
    previous: &mut HashMap<String, PreviousCounters>,
    snapshot: &InterfaceSnapshot,
) -> SnapshotOutcome {
    let name = snapshot.interface_name.clone();

    let Some(prev) = previous.get(&name) else {
        previous.insert(name.clone(), PreviousCounters::from(snapshot));
        return SnapshotOutcome::Baseline(TrafficDeltaRecord {
            interface_name: name,
            timestamp: snapshot.captured_at,
            rx_bytes: snapshot.rx_bytes,
            tx_bytes: snapshot.tx_bytes,
            rx_packets: snapshot.rx_packets,
            tx_packets: snapshot.tx_packets,
            collection_interval_seconds: 0.0,
        });
    };

    let elapsed = (snapshot.captured_at - prev.timestamp).num_milliseconds() as f64 / 1000.0;
    if elapsed <= 0.0 {
        return SnapshotOutcome::Stale;
    }

    let record = TrafficDeltaRecord {
        interface_name: name.clone(),
        timestamp: snapshot.captured_at,
        rx_bytes: counter_delta(prev.rx_bytes, snapshot.rx_bytes),
        tx_bytes: counter_delta(prev.tx_bytes, snapshot.tx_bytes),
        rx_packets: counter_delta(prev.rx_packets, snapshot.rx_packets),
        tx_packets: counter_delta(prev.tx_packets, snapshot.tx_packets),
        collection_interval_seconds: elapsed,
    };
    previous.insert(name, PreviousCounters::from(snapshot));
    SnapshotOutcome::Delta(record)
}

// ── Background scheduler ────────────────────────────────────────────

/// Run collection cycles on a fixed interval until cancelled.
///
/// Each cycle runs as its own task so that a panic inside one cycle is
/// caught at this boundary, counted as a full-cycle failure, and never
/// kills the ticker.
async fn poll_task<S, C, K>(collector: Collector<S, C, K>, period: Duration, cancel: CancellationToken)
where
    S: SnapshotSource,
    C: ConfigStore,
    K: TrafficSink,
{
    let mut ticker = tokio::time::interval(period);
    // Skip ticks that would overlap a still-running cycle instead of
    // bursting to catch up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let cycle = tokio::spawn({
                    let collector = collector.clone();
                    async move { collector.collect().await }
                });
                match cycle.await {
                    Ok(result) if result.success => {
                        debug!(interfaces = result.data.len(), "scheduled cycle completed");
                    }
                    Ok(result) => {
                        warn!(errors = result.errors.len(), "scheduled cycle degraded");
                    }
                    Err(err) => {
                        error!(error = %err, "scheduled cycle aborted unexpectedly");
                        collector.record_cycle_abort().await;
                    }
                }
            }
        }
    }
    debug!("poll task exiting");
}
