// notification.rs — Persisted in-app notifications and push registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An in-app notification row. Written once per recipient per event;
/// delivery over push is a separate, best-effort channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub body: String,
    /// Auxiliary payload forwarded to clients (report id, note id, …).
    #[serde(default)]
    pub data: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            title: title.into(),
            body: body.into(),
            data,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// A push device registration. Pruned when a provider reports the token
/// invalid or unregistered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceToken {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}
