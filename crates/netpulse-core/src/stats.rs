// ── Collection statistics ──
//
// Cumulative counters describing collection health. Owned by the
// collector and mutated only under its state lock; `total_polls ==
// successful_polls + failed_polls` holds whenever no cycle is mid-update.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Running counters across all cycles (scheduled and manual).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionStatistics {
    pub total_polls: u64,
    pub successful_polls: u64,
    pub failed_polls: u64,
    pub interfaces_monitored: usize,
    pub last_poll_time: Option<DateTime<Utc>>,
    pub last_successful_poll: Option<DateTime<Utc>>,
    pub total_errors: u64,
    pub consecutive_failures: u64,
    pub start_time: Option<DateTime<Utc>>,
}

impl CollectionStatistics {
    /// Fold one completed cycle into the counters.
    ///
    /// A cycle with zero faults is a success and resets the consecutive
    /// failure streak; any fault marks the whole cycle failed.
    pub(crate) fn record_cycle(&mut self, error_count: usize, now: DateTime<Utc>) {
        self.total_polls += 1;
        self.last_poll_time = Some(now);

        if error_count == 0 {
            self.successful_polls += 1;
            self.consecutive_failures = 0;
            self.last_successful_poll = Some(now);
        } else {
            self.failed_polls += 1;
            self.consecutive_failures += 1;
            self.total_errors += error_count as u64;
        }
    }

    /// Count a cycle that aborted before producing a result (caught at
    /// the scheduler-job boundary).
    pub(crate) fn record_cycle_abort(&mut self) {
        self.total_polls += 1;
        self.failed_polls += 1;
        self.consecutive_failures += 1;
        self.total_errors += 1;
    }

    /// Copy with a derived uptime, for status reporting.
    pub fn snapshot(&self, now: DateTime<Utc>) -> StatisticsSnapshot {
        let uptime_seconds = self
            .start_time
            .map_or(0.0, |start| (now - start).num_milliseconds() as f64 / 1000.0);
        StatisticsSnapshot {
            stats: self.clone(),
            uptime_seconds,
        }
    }
}

/// A point-in-time copy of [`CollectionStatistics`] plus uptime.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSnapshot {
    #[serde(flatten)]
    pub stats: CollectionStatistics,
    pub uptime_seconds: f64,
}
