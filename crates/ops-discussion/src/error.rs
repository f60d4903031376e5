// error.rs — Error types for discussion threads.

use thiserror::Error;
use uuid::Uuid;

/// Errors from note/reply/mark-read operations. Notification failures are
/// not represented here; they are logged and swallowed.
#[derive(Debug, Error)]
pub enum DiscussionError {
    /// The targeted note does not exist on this report.
    #[error("note '{0}' not found")]
    NoteNotFound(Uuid),

    /// The store failed (includes report NotFound).
    #[error(transparent)]
    Store(#[from] ops_store::StoreError),
}

impl DiscussionError {
    /// Whether this maps to 404 at the HTTP boundary.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NoteNotFound(_) => true,
            Self::Store(e) => e.is_not_found(),
        }
    }
}
