// error.rs — Error types for push delivery.
//
// These never propagate into business operations: the dispatcher logs
// them and moves on. They exist so transports can report *why* a send
// failed and so tests can assert on the classification.

use thiserror::Error;

/// Errors from a push transport call (whole-call failures, not per-token
/// outcomes).
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The provider endpoint could not be reached.
    #[error("push provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with something we could not interpret.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The provider rejected the whole request (bad credentials, quota).
    #[error("push provider rejected request: {0}")]
    Rejected(String),
}
