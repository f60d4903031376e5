// remote.rs — HTTP client for the third-party media store.
//
// The provider takes a multipart POST (file + folder + api key) and
// answers with a JSON body carrying the servable URL and the provider-side
// id. Each call is bounded by a client-level timeout so a stuck provider
// cannot hang a workflow transition indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use ops_model::StoredFile;
use serde::Deserialize;

use crate::error::MediaError;
use crate::MediaStore;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Production [`MediaStore`] backed by the configured upload endpoint.
pub struct RemoteMediaStore {
    client: reqwest::Client,
    upload_url: String,
    api_key: String,
}

/// Provider response shape for a successful upload.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

impl RemoteMediaStore {
    /// Build a client for the given provider endpoint and API key.
    pub fn new(upload_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            upload_url: upload_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl MediaStore for RemoteMediaStore {
    async fn upload(
        &self,
        bytes: &[u8],
        folder: &str,
        suggested_name: &str,
    ) -> Result<StoredFile, MediaError> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(suggested_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string())
            .text("api_key", self.api_key.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, name = suggested_name, "media upload rejected");
            return Err(MediaError::UploadFailed {
                name: suggested_name.to_string(),
                reason: format!("provider returned {status}: {body}"),
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::MalformedResponse(e.to_string()))?;

        tracing::debug!(name = suggested_name, folder, id = %parsed.public_id, "uploaded file");
        Ok(StoredFile::new(parsed.secure_url, parsed.public_id).with_name(suggested_name))
    }
}
