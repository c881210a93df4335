use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One interface's cumulative counters at one instant.
///
/// Produced fresh on every fetch and never persisted directly — only
/// deltas derived from pairs of snapshots reach storage. All counters
/// are cumulative since the interface came up and may wrap at the
/// platform's counter width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    pub interface_name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub tx_packets: u64,
    /// Wall-clock capture time for this snapshot.
    pub captured_at: DateTime<Utc>,
}

impl InterfaceSnapshot {
    /// Total bytes in both directions. Used by the primary-interface
    /// heuristic as a cumulative fallback score.
    pub fn total_bytes(&self) -> u64 {
        self.rx_bytes.saturating_add(self.tx_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rx: u64, tx: u64) -> InterfaceSnapshot {
        InterfaceSnapshot {
            interface_name: "eth0".into(),
            rx_bytes: rx,
            tx_bytes: tx,
            rx_packets: 10,
            tx_packets: 5,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn total_bytes_sums_both_directions() {
        assert_eq!(snapshot(1_000, 500).total_bytes(), 1_500);
    }

    #[test]
    fn total_bytes_saturates_instead_of_overflowing() {
        assert_eq!(snapshot(u64::MAX, 1).total_bytes(), u64::MAX);
    }

    #[test]
    fn snapshot_serializes_with_stable_field_names() {
        let json = serde_json::to_value(snapshot(1, 2)).unwrap();
        assert_eq!(json["interface_name"], "eth0");
        assert_eq!(json["rx_bytes"], 1);
        assert_eq!(json["tx_bytes"], 2);
    }
}
