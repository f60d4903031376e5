//! # ops-media
//!
//! Remote media storage for uploaded attachments.
//!
//! The workflow engine never talks to a storage provider directly; it goes
//! through the [`MediaStore`] trait, which uploads one blob and hands back
//! a stable [`StoredFile`] reference (URL + provider id). Two
//! implementations ship here:
//!
//! - [`RemoteMediaStore`] — the production client: multipart POST to the
//!   configured provider with a bounded per-call timeout.
//! - [`MemoryMediaStore`] — in-process map for tests, with scriptable
//!   failures.
//!
//! [`upload_all`] is the batch path used by file-accepting workflow
//! transitions: uploads run concurrently and the batch fails as a whole if
//! any single upload fails.

pub mod error;
pub mod memory;
pub mod remote;

pub use error::MediaError;
pub use memory::MemoryMediaStore;
pub use remote::RemoteMediaStore;

use async_trait::async_trait;
use futures::future::try_join_all;
use ops_model::StoredFile;

/// One file as received from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    /// Display filename suggested by the client.
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Abstraction over the remote object store.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist one blob under `folder` and return its stable reference.
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        suggested_name: &str,
    ) -> Result<StoredFile, MediaError>;
}

/// Upload a batch of files concurrently under one folder namespace.
///
/// Fail-fast, gather-all: if any upload fails the whole batch fails, and
/// the caller must not persist references for the ones that succeeded.
pub async fn upload_all(
    store: &dyn MediaStore,
    folder: &str,
    payloads: &[UploadPayload],
) -> Result<Vec<StoredFile>, MediaError> {
    let uploads = payloads
        .iter()
        .map(|payload| store.upload(&payload.bytes, folder, &payload.name));
    try_join_all(uploads).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_all_returns_references_in_order() {
        let store = MemoryMediaStore::new();
        let payloads = vec![
            UploadPayload {
                name: "receipt.pdf".into(),
                bytes: b"pdf".to_vec(),
            },
            UploadPayload {
                name: "waybill.pdf".into(),
                bytes: b"pdf2".to_vec(),
            },
        ];

        let files = upload_all(&store, "packages/PKG-1/u1", &payloads)
            .await
            .unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name.as_deref(), Some("receipt.pdf"));
        assert_eq!(files[1].name.as_deref(), Some("waybill.pdf"));
        assert_eq!(store.stored_count(), 2);
    }

    #[tokio::test]
    async fn upload_all_fails_whole_batch_on_one_failure() {
        let store = MemoryMediaStore::new();
        store.fail_uploads_matching("waybill.pdf");
        let payloads = vec![
            UploadPayload {
                name: "receipt.pdf".into(),
                bytes: b"pdf".to_vec(),
            },
            UploadPayload {
                name: "waybill.pdf".into(),
                bytes: b"pdf2".to_vec(),
            },
        ];

        let result = upload_all(&store, "packages/PKG-1/u1", &payloads).await;
        assert!(matches!(result, Err(MediaError::UploadFailed { .. })));
    }
}
