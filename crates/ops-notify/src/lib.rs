//! # ops-notify
//!
//! Push delivery and best-effort notification dispatch.
//!
//! Two redundant channels carry every notification: a persisted in-app
//! row (always written) and a push send over whichever
//! [`PushTransport`] the deployment has credentials for — the managed
//! multicast sender when messaging credentials are configured, else the
//! legacy HTTP-key gateway, else nothing (the service degrades to a
//! logged no-op).
//!
//! Delivery is strictly best-effort: [`NotificationService::deliver`]
//! never returns an error, because no notification outcome may fail the
//! business operation that triggered it. When a provider reports a
//! registration token permanently dead (`invalid_token` /
//! `unregistered_token` after normalization), the token row is pruned as
//! a side effect, independent of the send's own outcome.

pub mod error;
pub mod fcm;
pub mod httpkey;
pub mod mock;
pub mod transport;

pub use error::NotifyError;
pub use fcm::FcmTransport;
pub use httpkey::HttpKeyTransport;
pub use transport::{DeliveryFailure, PushMessage, PushTransport, TokenOutcome};

use std::sync::Arc;

use ops_model::Notification;
use ops_store::Store;

/// Dispatches notifications over both channels (persisted + push).
#[derive(Clone)]
pub struct NotificationService {
    store: Store,
    transport: Option<Arc<dyn PushTransport>>,
}

impl NotificationService {
    pub fn new(store: Store, transport: Option<Arc<dyn PushTransport>>) -> Self {
        match &transport {
            Some(t) => tracing::info!(transport = t.name(), "push transport configured"),
            None => tracing::info!("no push transport configured; sends will be no-ops"),
        }
        Self { store, transport }
    }

    /// A service with no push capability (still persists in-app rows).
    pub fn unavailable(store: Store) -> Self {
        Self::new(store, None)
    }

    /// Deliver one notification to one user over both channels.
    ///
    /// Infallible: every failure is logged and swallowed. The in-app row
    /// and the push attempt are independent; one failing does not stop
    /// the other.
    pub async fn deliver(&self, user_id: &str, title: &str, body: &str, data: serde_json::Value) {
        let notification = Notification::new(user_id, title, body, data.clone());
        if let Err(e) = self.store.insert_notification(&notification) {
            tracing::warn!(user_id, error = %e, "failed to persist in-app notification");
        }

        self.push(
            user_id,
            &PushMessage {
                title: title.to_string(),
                body: body.to_string(),
                data,
            },
        )
        .await;
    }

    /// Push half of the delivery. Prunes dead registrations.
    async fn push(&self, user_id: &str, message: &PushMessage) {
        let Some(transport) = &self.transport else {
            tracing::debug!(user_id, "push skipped: no transport configured");
            return;
        };

        let tokens = match self.store.device_tokens_for_user(user_id) {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load device tokens");
                return;
            }
        };
        if tokens.is_empty() {
            tracing::debug!(user_id, "push skipped: no registered devices");
            return;
        }

        let token_values: Vec<String> = tokens.into_iter().map(|t| t.token).collect();
        let outcomes = match transport.send(&token_values, message).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    transport = transport.name(),
                    error = %e,
                    "push send failed"
                );
                return;
            }
        };

        for outcome in outcomes {
            match outcome.result {
                Ok(()) => {}
                Err(failure) if failure.is_dead_registration() => {
                    tracing::info!(
                        user_id,
                        token = %outcome.token,
                        ?failure,
                        "pruning dead push registration"
                    );
                    if let Err(e) = self.store.delete_device_token(&outcome.token) {
                        tracing::warn!(token = %outcome.token, error = %e, "token prune failed");
                    }
                }
                Err(failure) => {
                    tracing::warn!(user_id, token = %outcome.token, ?failure, "push delivery failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use tempfile::tempdir;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("ops.db")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn deliver_persists_even_without_transport() {
        let (_dir, store) = test_store();
        let service = NotificationService::unavailable(store.clone());

        service
            .deliver("u1", "New note", "body", serde_json::json!({}))
            .await;

        assert_eq!(store.list_notifications("u1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deliver_sends_to_registered_tokens() {
        let (_dir, store) = test_store();
        store.upsert_device_token("u1", "tok-a").unwrap();
        store.upsert_device_token("u1", "tok-b").unwrap();

        let transport = Arc::new(MockTransport::new());
        let service = NotificationService::new(store.clone(), Some(transport.clone()));
        service
            .deliver("u1", "New note", "body", serde_json::json!({"reportId": "r1"}))
            .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.len(), 2);
        assert_eq!(sent[0].1.title, "New note");
    }

    #[tokio::test]
    async fn dead_registrations_are_pruned() {
        let (_dir, store) = test_store();
        store.upsert_device_token("u1", "tok-live").unwrap();
        store.upsert_device_token("u1", "tok-dead").unwrap();

        let transport = Arc::new(MockTransport::new());
        transport.fail_token("tok-dead", DeliveryFailure::UnregisteredToken);

        let service = NotificationService::new(store.clone(), Some(transport));
        service.deliver("u1", "t", "b", serde_json::json!(null)).await;

        let remaining = store.device_tokens_for_user("u1").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token, "tok-live");
    }

    #[tokio::test]
    async fn transient_failures_do_not_prune() {
        let (_dir, store) = test_store();
        store.upsert_device_token("u1", "tok-a").unwrap();

        let transport = Arc::new(MockTransport::new());
        transport.fail_token("tok-a", DeliveryFailure::Other("timeout".into()));

        let service = NotificationService::new(store.clone(), Some(transport));
        service.deliver("u1", "t", "b", serde_json::json!(null)).await;

        assert_eq!(store.device_tokens_for_user("u1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn no_tokens_is_a_silent_no_op() {
        let (_dir, store) = test_store();
        let transport = Arc::new(MockTransport::new());
        let service = NotificationService::new(store.clone(), Some(transport.clone()));

        service.deliver("u1", "t", "b", serde_json::json!(null)).await;

        assert_eq!(transport.send_count(), 0);
        // The in-app row is still written.
        assert_eq!(store.list_notifications("u1").unwrap().len(), 1);
    }
}
