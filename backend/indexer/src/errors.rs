//! Errors of the indexer binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The node rejected the `getEvents` request itself; retrying won't help.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("getEvents response has neither a result nor an error")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, IndexerError>;
