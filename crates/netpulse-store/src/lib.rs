// netpulse-store: SQLite-backed traffic history and key/value configuration.

pub mod database;
pub mod error;
pub mod traffic;

pub use database::{Database, DatabaseStats};
pub use error::StoreError;
pub use traffic::{
    AggregatedPoint, AggregationWindow, HistoryFilter, NewTrafficRecord, StoredTrafficRecord,
};
