// memory.rs — In-process media store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use ops_model::StoredFile;
use uuid::Uuid;

use crate::error::MediaError;
use crate::MediaStore;

/// Test double for [`MediaStore`]: keeps blobs in a map and can be told to
/// fail uploads whose suggested name contains a marker string.
#[derive(Default)]
pub struct MemoryMediaStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    fail_matching: Mutex<Option<String>>,
    upload_calls: AtomicUsize,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any upload whose name contains `marker` will fail.
    pub fn fail_uploads_matching(&self, marker: impl Into<String>) {
        *self.fail_matching.lock().unwrap() = Some(marker.into());
    }

    pub fn stored_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        suggested_name: &str,
    ) -> Result<StoredFile, MediaError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(marker) = self.fail_matching.lock().unwrap().as_deref() {
            if suggested_name.contains(marker) {
                return Err(MediaError::UploadFailed {
                    name: suggested_name.to_string(),
                    reason: "scripted test failure".to_string(),
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        let key = format!("{folder}/{id}");
        self.blobs.lock().unwrap().insert(key.clone(), bytes.to_vec());

        Ok(StoredFile::new(format!("memory://{key}"), id).with_name(suggested_name))
    }
}
