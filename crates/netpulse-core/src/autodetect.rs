// ── One-shot primary-interface detection ──
//
// Runs at setup time, never during collection. Samples all candidate
// interfaces over a short window, scores them by observed traffic, and
// seeds the initial configuration with the winner.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use netpulse_net::InterfaceSnapshot;

use crate::config::{initialize_config, keys};
use crate::delta::counter_delta;
use crate::error::{CollectorError, SourceError};
use crate::traits::{ConfigStore, SnapshotSource};

/// Tuning for the detection window.
#[derive(Debug, Clone)]
pub struct AutodetectSettings {
    /// Number of snapshots taken across the window (minimum 2).
    pub samples: u32,
    /// Delay between samples.
    pub sample_interval: std::time::Duration,
    /// Minimum score (bytes moved, packet-weighted) for an interface to
    /// win on observed traffic alone.
    pub min_score: u64,
}

impl Default for AutodetectSettings {
    fn default() -> Self {
        Self {
            samples: 10,
            sample_interval: std::time::Duration::from_secs(1),
            min_score: 1_000,
        }
    }
}

/// Whether an interface is worth considering as primary.
///
/// Loopback and container plumbing (docker bridges, veth pairs) carry
/// traffic but never route to the outside world.
fn is_candidate(name: &str) -> bool {
    if matches!(name, "lo" | "lo0" | "loopback") {
        return false;
    }
    !(name.starts_with("docker") || name.starts_with("veth") || name.starts_with("br-"))
}

/// Identify the busiest candidate interface over a monitoring window.
///
/// Returns `None` when no candidate exists or nothing moved at all.
/// When the window is quiet but counters show historical traffic, the
/// interface with the largest cumulative total wins as a fallback.
pub async fn identify_primary_interface<S: SnapshotSource>(
    source: &S,
    settings: &AutodetectSettings,
) -> Result<Option<String>, SourceError> {
    let samples = settings.samples.max(2);

    let mut first = source.snapshot_all().await?;
    first.retain(|name, _| is_candidate(name));
    if first.is_empty() {
        warn!("no candidate interfaces for primary detection");
        return Ok(None);
    }
    info!(
        candidates = first.len(),
        window_secs = settings.sample_interval.as_secs_f64() * f64::from(samples - 1),
        "monitoring traffic to identify primary interface"
    );

    let mut last: HashMap<String, InterfaceSnapshot> = first.clone();
    for _ in 1..samples {
        tokio::time::sleep(settings.sample_interval).await;
        match source.snapshot_all().await {
            Ok(current) => {
                for (name, snapshot) in current {
                    if first.contains_key(&name) {
                        last.insert(name, snapshot);
                    }
                }
            }
            Err(err) => debug!(error = %err, "sample failed during detection window"),
        }
    }

    let intervals = u64::from(samples - 1);
    let mut best: Option<(&str, u64)> = None;
    for (name, initial) in &first {
        let Some(current) = last.get(name) else {
            continue;
        };
        let bytes = counter_delta(initial.rx_bytes, current.rx_bytes)
            .saturating_add(counter_delta(initial.tx_bytes, current.tx_bytes));
        let packets = counter_delta(initial.rx_packets, current.rx_packets)
            .saturating_add(counter_delta(initial.tx_packets, current.tx_packets));
        // Weight sustained packet rate so a chatty-but-lean interface
        // can outrank a single large burst.
        let score = bytes.saturating_add((packets / intervals).saturating_mul(1_000));
        debug!(interface = name.as_str(), score, "scored interface");

        if best.is_none_or(|(_, top)| score > top) {
            best = Some((name.as_str(), score));
        }
    }

    if let Some((name, score)) = best {
        if score >= settings.min_score {
            info!(interface = name, score, "identified primary interface");
            return Ok(Some(name.to_owned()));
        }
    }

    // Quiet window: fall back to cumulative totals.
    let fallback = last
        .values()
        .filter(|snapshot| snapshot.total_bytes() > 0)
        .max_by_key(|snapshot| snapshot.total_bytes())
        .map(|snapshot| snapshot.interface_name.clone());
    match &fallback {
        Some(name) => info!(interface = name.as_str(), "primary interface from cumulative totals"),
        None => warn!("no interface with any traffic; primary detection inconclusive"),
    }
    Ok(fallback)
}

/// Run detection and seed the configuration store.
///
/// Sets `primary_interface` and, when no monitored-interface list is
/// configured yet, points `collector.monitored_interfaces` at the
/// winner. Collector defaults are seeded for any keys still unset, and
/// a completion marker is recorded.
pub async fn populate_initial_config<S, C>(
    source: &S,
    config: &C,
    settings: &AutodetectSettings,
) -> Result<Option<String>, CollectorError>
where
    S: SnapshotSource,
    C: ConfigStore,
{
    let primary = identify_primary_interface(source, settings).await?;

    if let Some(ref name) = primary {
        config.set(keys::PRIMARY_INTERFACE, name).await?;

        let monitored = config.get(keys::MONITORED_INTERFACES).await?;
        if monitored.as_deref().is_none_or(str::is_empty) {
            config.set(keys::MONITORED_INTERFACES, name).await?;
            info!(interface = name.as_str(), "monitoring primary interface");
        }
    }

    initialize_config(config).await?;
    config.set(keys::AUTO_DETECTION_COMPLETED, "true").await?;
    config
        .set(keys::AUTO_DETECTION_TIMESTAMP, &Utc::now().to_rfc3339())
        .await?;

    Ok(primary)
}
