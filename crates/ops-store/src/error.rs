// error.rs — Error types for the persistence layer.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The pool could not hand out a connection (exhausted or poisoned).
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A query or statement failed.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A JSON column failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A timestamp column held a value that is not RFC 3339.
    #[error("malformed timestamp in column '{column}': {value}")]
    MalformedTimestamp { column: &'static str, value: String },

    /// The progress column held a value outside the 0–255 range.
    #[error("malformed progress value: {0}")]
    MalformedProgress(i64),
}

impl StoreError {
    /// Shorthand for a typed NotFound.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether this error is a NotFound (used by HTTP mapping).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
