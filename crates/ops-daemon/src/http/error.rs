// error.rs — The service-wide HTTP error taxonomy.
//
// Every handler returns `Result<_, ApiError>`; domain errors convert in
// via `From` impls that consult the domain enums' own classification
// helpers. Internal causes are logged here and never leak into the
// response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ops_discussion::DiscussionError;
use ops_store::StoreError;
use ops_workflow::WorkflowError;

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code.
    pub code: &'static str,
    pub message: String,
}

/// The five caller-visible error kinds.
#[derive(Debug)]
pub enum ApiError {
    /// Target entity does not exist → 404.
    NotFound(String),
    /// Request was malformed or semantically invalid → 400.
    InvalidArgument(String),
    /// Caller lacks the required capability → 403.
    PermissionDenied(String),
    /// A media upload failed; the operation was aborted whole → 500.
    UploadFailed(String),
    /// Anything else → 500 with a generic body.
    Internal,
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        let (status, code, message) = match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone()),
            Self::InvalidArgument(message) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message.clone())
            }
            Self::PermissionDenied(message) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", message.clone())
            }
            Self::UploadFailed(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPLOAD_FAILED",
                message.clone(),
            ),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "internal error".to_string(),
            ),
        };
        (
            status,
            ErrorBody {
                error: ErrorDetail { code, message },
            },
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, axum::Json(body)).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(e: WorkflowError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else if e.is_invalid_argument() {
            Self::InvalidArgument(e.to_string())
        } else if let WorkflowError::Upload(cause) = &e {
            tracing::error!(error = %cause, "upload failed, operation aborted");
            Self::UploadFailed(e.to_string())
        } else {
            tracing::error!(error = %e, "workflow operation failed");
            Self::Internal
        }
    }
}

impl From<DiscussionError> for ApiError {
    fn from(e: DiscussionError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else {
            tracing::error!(error = %e, "discussion operation failed");
            Self::Internal
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        if e.is_not_found() {
            Self::NotFound(e.to_string())
        } else {
            tracing::error!(error = %e, "store operation failed");
            Self::Internal
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        Self::InvalidArgument(format!("malformed multipart body: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_contract_statuses() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                ApiError::InvalidArgument("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::PermissionDenied("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::UploadFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn internal_body_is_generic() {
        let (_, body) = ApiError::Internal.status_and_body();
        assert_eq!(body.error.message, "internal error");
    }

    #[test]
    fn workflow_errors_classify() {
        let e: ApiError = WorkflowError::UserNotFound("ghost".into()).into();
        assert!(matches!(e, ApiError::NotFound(_)));
        let e: ApiError = WorkflowError::UnknownStage("bogus".into()).into();
        assert!(matches!(e, ApiError::InvalidArgument(_)));
        let e: ApiError = WorkflowError::EmptyUpdate.into();
        assert!(matches!(e, ApiError::InvalidArgument(_)));
    }
}
