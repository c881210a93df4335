// ── Traffic record types and query parameters ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::StoreError;

/// One traffic row to be inserted.
///
/// Counter fields are per-interval deltas, except for baseline rows
/// (`collection_interval_seconds == 0.0`) which carry the raw cumulative
/// counters from the first observation of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrafficRecord {
    pub timestamp: DateTime<Utc>,
    pub interface_name: String,
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub rx_packets: i64,
    pub tx_packets: i64,
    pub collection_interval_seconds: f64,
}

/// A traffic row as stored, with its assigned id.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredTrafficRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub interface_name: String,
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub rx_packets: i64,
    pub tx_packets: i64,
    pub collection_interval_seconds: f64,
    pub created_at: NaiveDateTime,
}

/// One bucket of averaged traffic from the aggregation query.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AggregatedPoint {
    pub timestamp: DateTime<Utc>,
    pub interface_name: String,
    pub rx_bytes: i64,
    pub tx_bytes: i64,
    pub rx_packets: i64,
    pub tx_packets: i64,
}

/// Optional filters for raw history queries. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub interface: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Lookback window for the aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationWindow {
    Hour1,
    Hour6,
    #[default]
    Hour24,
    Day7,
    Day30,
}

impl AggregationWindow {
    /// The cutoff timestamp: rows older than this are excluded.
    pub fn cutoff(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let span = match self {
            Self::Hour1 => Duration::hours(1),
            Self::Hour6 => Duration::hours(6),
            Self::Hour24 => Duration::hours(24),
            Self::Day7 => Duration::days(7),
            Self::Day30 => Duration::days(30),
        };
        now - span
    }
}

impl FromStr for AggregationWindow {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(Self::Hour1),
            "6h" => Ok(Self::Hour6),
            "24h" => Ok(Self::Hour24),
            "7d" => Ok(Self::Day7),
            "30d" => Ok(Self::Day30),
            other => Err(StoreError::InvalidWindow {
                window: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for AggregationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Hour1 => "1h",
            Self::Hour6 => "6h",
            Self::Hour24 => "24h",
            Self::Day7 => "7d",
            Self::Day30 => "30d",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parses_all_known_spans() {
        for (text, window) in [
            ("1h", AggregationWindow::Hour1),
            ("6h", AggregationWindow::Hour6),
            ("24h", AggregationWindow::Hour24),
            ("7d", AggregationWindow::Day7),
            ("30d", AggregationWindow::Day30),
        ] {
            assert_eq!(text.parse::<AggregationWindow>().unwrap(), window);
            assert_eq!(window.to_string(), text);
        }
    }

    #[test]
    fn window_rejects_unknown_span() {
        assert!("90m".parse::<AggregationWindow>().is_err());
    }

    #[test]
    fn cutoff_is_in_the_past() {
        let now = Utc::now();
        for window in [
            AggregationWindow::Hour1,
            AggregationWindow::Day30,
        ] {
            assert!(window.cutoff(now) < now);
        }
    }
}
