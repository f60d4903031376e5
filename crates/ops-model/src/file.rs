// file.rs — Stored-file references returned by the media store.

use serde::{Deserialize, Serialize};

/// A stable reference to a file persisted in remote storage.
///
/// The media store returns one of these per upload; the `id` is the
/// provider-side identifier and `url` is directly servable to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Publicly servable URL of the stored blob.
    pub url: String,
    /// Provider-side identifier (used for later deletion or lookup).
    pub id: String,
    /// Display filename as uploaded, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl StoredFile {
    pub fn new(url: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: id.into(),
            name: None,
        }
    }

    /// Set the display filename and return self (builder pattern).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
