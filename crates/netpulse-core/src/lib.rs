// netpulse-core: rollover-safe delta collection over host interface counters.
//
// The `Collector` is generic over three collaborator traits -- where the
// counters come from (`SnapshotSource`), where configuration lives
// (`ConfigStore`), and where delta records go (`TrafficSink`). The glue
// impls for the concrete `netpulse-net` / `netpulse-store` types live in
// `sources`; tests substitute in-memory fakes.

pub mod autodetect;
pub mod collector;
pub mod config;
pub mod delta;
pub mod error;
pub mod model;
pub mod retry;
pub mod sources;
pub mod stats;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collector::Collector;
pub use config::{CollectorSettings, initialize_config, keys};
pub use delta::counter_delta;
pub use error::{CollectorError, ConfigError, SinkError, SourceError};
pub use model::{
    CollectionCycleResult, CollectorStatus, CycleFault, ManualCollection, TrafficDeltaRecord,
};
pub use sources::SystemSnapshotSource;
pub use stats::{CollectionStatistics, StatisticsSnapshot};
pub use traits::{ConfigStore, SnapshotSource, TrafficSink};

// Re-export the snapshot type that flows through the collaborator traits.
pub use netpulse_net::InterfaceSnapshot;
