// error.rs — Error types for the media store.

use thiserror::Error;

/// Errors that can occur while persisting uploaded files.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The provider rejected or failed the upload. Any upload failure in a
    /// batch aborts the whole triggering operation (no partial attachment
    /// rows are written).
    #[error("upload of '{name}' failed: {reason}")]
    UploadFailed { name: String, reason: String },

    /// The HTTP call to the provider could not complete.
    #[error("media provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a response we could not interpret.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}
