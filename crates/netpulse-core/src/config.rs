// ── Collector configuration ──
//
// Tuning knobs live in the Configuration Store under `collector.*`
// keys. Bad or missing values always fall back to defaults -- a broken
// configuration row must never stop collection.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::traits::ConfigStore;

/// Configuration keys used by the collector and setup routines.
pub mod keys {
    pub const MONITORED_INTERFACES: &str = "collector.monitored_interfaces";
    pub const POLLING_INTERVAL: &str = "collector.polling_interval";
    pub const MAX_RETRIES: &str = "collector.max_retries";
    pub const RETRY_DELAY: &str = "collector.retry_delay";
    pub const LAST_COLLECTION: &str = "collector.last_collection";

    pub const PRIMARY_INTERFACE: &str = "primary_interface";
    pub const AUTO_DETECTION_COMPLETED: &str = "auto_detection_completed";
    pub const AUTO_DETECTION_TIMESTAMP: &str = "auto_detection_timestamp";
}

pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Resolved collector tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorSettings {
    /// Seconds between scheduled cycles.
    pub polling_interval: Duration,
    /// Attempts for sink writes (snapshot fetches are never retried
    /// within a cycle; the next cycle is the retry).
    pub max_retries: u32,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
    /// Bound on how long `stop()` waits for an in-flight cycle.
    pub stop_timeout: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            polling_interval: DEFAULT_POLLING_INTERVAL,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            stop_timeout: Duration::from_secs(5),
        }
    }
}

impl CollectorSettings {
    /// Resolve settings from the configuration store, tolerating
    /// missing or unparseable values.
    pub async fn load<C: ConfigStore>(config: &C) -> Self {
        let mut settings = Self::default();

        if let Some(secs) = read_parsed::<u64, _>(config, keys::POLLING_INTERVAL).await {
            if secs > 0 {
                settings.polling_interval = Duration::from_secs(secs);
            }
        }
        if let Some(retries) = read_parsed::<u32, _>(config, keys::MAX_RETRIES).await {
            settings.max_retries = retries.max(1);
        }
        if let Some(delay) = read_parsed::<f64, _>(config, keys::RETRY_DELAY).await {
            if delay >= 0.0 {
                settings.retry_delay = Duration::from_secs_f64(delay);
            }
        }

        settings
    }
}

async fn read_parsed<T: std::str::FromStr, C: ConfigStore>(config: &C, key: &str) -> Option<T> {
    match config.get(key).await {
        Ok(Some(raw)) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(key, value = %raw, "unparseable configuration value; using default");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!(key, error = %err, "failed to read configuration; using default");
            None
        }
    }
}

/// Seed default configuration for keys that are not yet set.
///
/// Called during application startup; existing values are left alone.
pub async fn initialize_config<C: ConfigStore>(config: &C) -> Result<(), ConfigError> {
    let defaults = [
        (keys::POLLING_INTERVAL, "30"),
        (keys::MAX_RETRIES, "3"),
        (keys::RETRY_DELAY, "1.0"),
        // Empty means "monitor all interfaces".
        (keys::MONITORED_INTERFACES, ""),
    ];

    for (key, default) in defaults {
        if config.get(key).await?.is_none() {
            config.set(key, default).await?;
            info!(key, default, "seeded default configuration");
        }
    }
    Ok(())
}
