// error.rs — Error types for the workflow engine.

use thiserror::Error;

/// Errors from workflow operations. The HTTP layer maps these onto the
/// service-wide taxonomy (NotFound → 404, InvalidArgument → 400,
/// UploadFailed → 500).
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The acting user could not be resolved from their username.
    #[error("user '{0}' not found")]
    UserNotFound(String),

    /// An unrecognized stage id was submitted.
    #[error("unknown stage id '{0}'")]
    UnknownStage(String),

    /// A project-only operation was attempted on another report type.
    #[error("report '{0}' is not a project report")]
    NotProjectReport(String),

    /// An update carried no updatable fields.
    #[error("no updatable fields supplied")]
    EmptyUpdate,

    /// A file upload failed; the whole operation is aborted with no
    /// partial writes.
    #[error("upload failed: {0}")]
    Upload(#[from] ops_media::MediaError),

    /// The store failed (includes entity NotFound).
    #[error(transparent)]
    Store(#[from] ops_store::StoreError),
}

impl WorkflowError {
    /// Whether this maps to 404 at the HTTP boundary.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::UserNotFound(_) => true,
            Self::Store(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Whether this maps to 400 at the HTTP boundary.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::UnknownStage(_) | Self::NotProjectReport(_) | Self::EmptyUpdate
        )
    }
}
