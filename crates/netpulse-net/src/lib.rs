// netpulse-net: thin wrapper over the host's network-interface counters.

pub mod error;
pub mod monitor;
pub mod snapshot;

pub use error::NetError;
pub use monitor::{InterfaceDetails, SystemNetwork, TrafficSummary};
pub use snapshot::InterfaceSnapshot;
