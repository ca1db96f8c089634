//! Errors raised inside the SQLite store.

use barcode_bridge_core::StoreError;

/// SQLite store failures, mapped onto [`StoreError`] at the trait boundary.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    /// SQLite rejected a statement or the database could not be opened.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking holder.
    #[error("connection lock poisoned: {0}")]
    Lock(String),

    /// The settings singleton has never been saved.
    #[error("barcode print settings not found")]
    SettingsNotFound,
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::SettingsNotFound => {
                StoreError::not_found("Barcode Print Settings", "singleton")
            }
            SqliteStoreError::Sqlite(rusqlite::Error::FromSqlConversionFailure(col, _, e)) => {
                StoreError::Corrupt {
                    entity: format!("column {col}"),
                    reason: e.to_string(),
                }
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Result alias used inside the store.
pub type SqliteResult<T> = Result<T, SqliteStoreError>;
