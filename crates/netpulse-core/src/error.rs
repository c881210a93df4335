// ── Core error types ──
//
// Collaborator errors (`SourceError`, `ConfigError`, `SinkError`) are
// what the traits in `traits` speak; they are deliberately small so
// fakes and adapters stay trivial. `CollectorError` covers scheduler
// lifecycle failures surfaced synchronously to callers of
// `start()`/`stop()` and setup routines.

use thiserror::Error;

/// Errors from a [`SnapshotSource`](crate::traits::SnapshotSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The interface disappeared or never existed.
    #[error("Interface '{interface}' not found or not active")]
    InterfaceNotFound { interface: String },

    /// Counter read failed for another reason (permissions, transient
    /// platform fault, source unreachable).
    #[error("Counter read failed: {message}")]
    Unavailable { message: String },
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InterfaceNotFound { .. })
    }
}

/// Errors from a [`ConfigStore`](crate::traits::ConfigStore).
#[derive(Debug, Error)]
#[error("Configuration store error: {message}")]
pub struct ConfigError {
    pub message: String,
}

/// Errors from a [`TrafficSink`](crate::traits::TrafficSink).
#[derive(Debug, Error)]
#[error("Persistence failed: {message}")]
pub struct SinkError {
    pub message: String,
}

/// Scheduler-lifecycle and setup errors.
///
/// Per-interface faults never appear here -- they are aggregated into
/// the cycle result as [`CycleFault`](crate::model::CycleFault) entries
/// instead of propagating.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Collector is already running")]
    AlreadyRunning,

    #[error("Failed to initialize scheduler: {message}")]
    SchedulerInit { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

// ── Conversions from leaf-crate errors ──────────────────────────────

impl From<netpulse_net::NetError> for SourceError {
    fn from(err: netpulse_net::NetError) -> Self {
        match err {
            netpulse_net::NetError::InterfaceNotFound { interface } => {
                Self::InterfaceNotFound { interface }
            }
            netpulse_net::NetError::Counters { message } => Self::Unavailable { message },
        }
    }
}

impl From<netpulse_store::StoreError> for ConfigError {
    fn from(err: netpulse_store::StoreError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

impl From<netpulse_store::StoreError> for SinkError {
    fn from(err: netpulse_store::StoreError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
