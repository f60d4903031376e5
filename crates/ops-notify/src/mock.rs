// mock.rs — Scriptable in-process transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::transport::{DeliveryFailure, PushMessage, PushTransport, TokenOutcome};

/// Test double for [`PushTransport`]: records every send and fails the
/// tokens it has been scripted to fail.
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<(Vec<String>, PushMessage)>>,
    failures: Mutex<HashMap<String, DeliveryFailure>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a per-token failure for subsequent sends.
    pub fn fail_token(&self, token: impl Into<String>, failure: DeliveryFailure) {
        self.failures.lock().unwrap().insert(token.into(), failure);
    }

    /// Every (tokens, message) pair this transport has been asked to send.
    pub fn sent(&self) -> Vec<(Vec<String>, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl PushTransport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<TokenOutcome>, NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((tokens.to_vec(), message.clone()));

        let failures = self.failures.lock().unwrap();
        Ok(tokens
            .iter()
            .map(|token| TokenOutcome {
                token: token.clone(),
                result: match failures.get(token) {
                    Some(failure) => Err(failure.clone()),
                    None => Ok(()),
                },
            })
            .collect())
    }
}
