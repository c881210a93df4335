use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Invalid aggregation window '{window}' (expected 1h, 6h, 24h, 7d, or 30d)")]
    InvalidWindow { window: String },

    #[error("Database file error: {0}")]
    Io(#[from] std::io::Error),
}
