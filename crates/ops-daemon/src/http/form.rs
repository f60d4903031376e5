// form.rs — Multipart form collection for the file-accepting routes.

use std::collections::HashMap;

use axum::extract::Multipart;
use ops_media::UploadPayload;

use crate::http::error::ApiError;

/// A fully-read multipart request: text fields by name, file parts in
/// submission order.
pub struct SubmittedForm {
    fields: HashMap<String, String>,
    pub files: Vec<UploadPayload>,
}

impl SubmittedForm {
    /// Drain a multipart body. Parts carrying a filename become upload
    /// payloads regardless of their field name; the rest are text fields.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    files.push(UploadPayload {
                        name: file_name,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field.text().await?;
                    fields.insert(name, value);
                }
            }
        }

        Ok(Self { fields, files })
    }

    /// A required text field; absence is the caller's error.
    pub fn require(&self, name: &str) -> Result<&str, ApiError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::InvalidArgument(format!("missing field '{name}'")))
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}
