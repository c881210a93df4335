// ── SQLite database handle ──
//
// One pool per process. Schema bootstrap runs on connect and is
// idempotent, so opening an existing database is a no-op upgrade.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::traffic::{
    AggregatedPoint, AggregationWindow, HistoryFilter, NewTrafficRecord, StoredTrafficRecord,
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS traffic_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        interface_name TEXT NOT NULL,
        rx_bytes INTEGER NOT NULL DEFAULT 0,
        tx_bytes INTEGER NOT NULL DEFAULT 0,
        rx_packets INTEGER NOT NULL DEFAULT 0,
        tx_packets INTEGER NOT NULL DEFAULT 0,
        collection_interval_seconds REAL NOT NULL DEFAULT 0.0,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS configuration (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT UNIQUE NOT NULL,
        value TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_traffic_data_timestamp
        ON traffic_data(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_traffic_data_interface
        ON traffic_data(interface_name)",
    "CREATE INDEX IF NOT EXISTS idx_configuration_key
        ON configuration(key)",
];

/// Database statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub traffic_data_records: i64,
    pub configuration_records: i64,
    pub database_size_bytes: u64,
    pub database_path: String,
}

/// Handle to the Net-Pulse SQLite database.
///
/// Cheaply cloneable; all methods take `&self` and are safe to call
/// concurrently from the collector and any query surface.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if missing) the database at `path` and bootstrap
    /// the schema.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            path: Some(path.to_owned()),
        };
        db.init_schema().await?;
        info!(path = %path.display(), "database ready");
        Ok(db)
    }

    /// In-memory database for tests and throwaway runs.
    ///
    /// Pinned to a single connection: each SQLite `:memory:` connection
    /// is its own database.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool, path: None };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ── Traffic data ─────────────────────────────────────────────────

    /// Insert one traffic row, returning its id.
    pub async fn insert_traffic_record(
        &self,
        record: &NewTrafficRecord,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO traffic_data (
                timestamp, interface_name, rx_bytes, tx_bytes,
                rx_packets, tx_packets, collection_interval_seconds
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.timestamp)
        .bind(&record.interface_name)
        .bind(record.rx_bytes)
        .bind(record.tx_bytes)
        .bind(record.rx_packets)
        .bind(record.tx_packets)
        .bind(record.collection_interval_seconds)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, interface = %record.interface_name, "inserted traffic record");
        Ok(id)
    }

    /// Raw history, newest first, with optional filters.
    pub async fn traffic_history(
        &self,
        filter: &HistoryFilter,
    ) -> Result<Vec<StoredTrafficRecord>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, timestamp, interface_name, rx_bytes, tx_bytes,
                    rx_packets, tx_packets, collection_interval_seconds, created_at
             FROM traffic_data WHERE 1=1",
        );

        if let Some(ref interface) = filter.interface {
            query.push(" AND interface_name = ").push_bind(interface.clone());
        }
        if let Some(start) = filter.start {
            query.push(" AND timestamp >= ").push_bind(start);
        }
        if let Some(end) = filter.end {
            query.push(" AND timestamp <= ").push_bind(end);
        }
        query.push(" ORDER BY timestamp DESC");

        match (filter.limit, filter.offset) {
            (Some(limit), Some(offset)) => {
                query.push(" LIMIT ").push_bind(limit);
                query.push(" OFFSET ").push_bind(offset);
            }
            (Some(limit), None) => {
                query.push(" LIMIT ").push_bind(limit);
            }
            (None, Some(offset)) => {
                // SQLite requires a LIMIT clause before OFFSET; -1 means "all".
                query.push(" LIMIT -1 OFFSET ").push_bind(offset);
            }
            (None, None) => {}
        }

        Ok(query
            .build_query_as::<StoredTrafficRecord>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Bucketed averages over a lookback window, at most `points` rows.
    ///
    /// Buckets are formed by row number rather than by time so the
    /// result has a stable size even when sampling was uneven.
    pub async fn aggregated_traffic(
        &self,
        window: AggregationWindow,
        points: u32,
        interface: Option<&str>,
    ) -> Result<Vec<AggregatedPoint>, StoreError> {
        let cutoff = window.cutoff(Utc::now());
        let points = i64::from(points.max(1));

        let mut query = QueryBuilder::<Sqlite>::new(
            "WITH ranked AS (
                SELECT timestamp, interface_name, rx_bytes, tx_bytes,
                       rx_packets, tx_packets,
                       ROW_NUMBER() OVER (ORDER BY timestamp ASC) AS row_num
                FROM traffic_data WHERE timestamp >= ",
        );
        query.push_bind(cutoff);
        if let Some(interface) = interface {
            query.push(" AND interface_name = ").push_bind(interface.to_owned());
        }
        query.push("), bucket AS (SELECT MAX(1, COUNT(*) / ");
        query.push_bind(points);
        query.push(
            ") AS size FROM ranked)
             SELECT MAX(ranked.timestamp) AS timestamp,
                    ranked.interface_name AS interface_name,
                    CAST(AVG(ranked.rx_bytes) AS INTEGER) AS rx_bytes,
                    CAST(AVG(ranked.tx_bytes) AS INTEGER) AS tx_bytes,
                    CAST(AVG(ranked.rx_packets) AS INTEGER) AS rx_packets,
                    CAST(AVG(ranked.tx_packets) AS INTEGER) AS tx_packets
             FROM ranked CROSS JOIN bucket
             GROUP BY (ranked.row_num - 1) / bucket.size, ranked.interface_name
             ORDER BY timestamp ASC LIMIT ",
        );
        query.push_bind(points);

        Ok(query
            .build_query_as::<AggregatedPoint>()
            .fetch_all(&self.pool)
            .await?)
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Read one configuration value, `None` if the key is unset.
    pub async fn config_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT value FROM configuration WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Set or update one configuration value.
    pub async fn set_config_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO configuration (key, value, updated_at)
             VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key, "configuration value set");
        Ok(())
    }

    // ── Monitoring ───────────────────────────────────────────────────

    pub async fn database_stats(&self) -> Result<DatabaseStats, StoreError> {
        let traffic_data_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM traffic_data")
            .fetch_one(&self.pool)
            .await?;
        let configuration_records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM configuration")
            .fetch_one(&self.pool)
            .await?;

        let (database_path, database_size_bytes) = match &self.path {
            Some(path) => (
                path.display().to_string(),
                std::fs::metadata(path).map_or(0, |meta| meta.len()),
            ),
            None => (":memory:".to_owned(), 0),
        };

        Ok(DatabaseStats {
            traffic_data_records,
            configuration_records,
            database_size_bytes,
            database_path,
        })
    }
}
