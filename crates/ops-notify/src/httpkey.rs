// httpkey.rs — Legacy HTTP-key sender (fallback transport).
//
// One POST per token against the legacy gateway, authenticated by a flat
// API key. Kept for deployments that never received managed messaging
// credentials. Dead registrations surface as HTTP statuses rather than a
// result vocabulary; the mapping below normalizes them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use crate::error::NotifyError;
use crate::transport::{DeliveryFailure, PushMessage, PushTransport, TokenOutcome};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-token sender for the legacy push gateway.
pub struct HttpKeyTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpKeyTransport {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Translate gateway statuses into canonical kinds.
    fn classify(status: StatusCode) -> DeliveryFailure {
        match status {
            StatusCode::BAD_REQUEST => DeliveryFailure::InvalidToken,
            StatusCode::NOT_FOUND | StatusCode::GONE => DeliveryFailure::UnregisteredToken,
            other => DeliveryFailure::Other(format!("gateway returned {other}")),
        }
    }
}

#[async_trait]
impl PushTransport for HttpKeyTransport {
    fn name(&self) -> &'static str {
        "http-key"
    }

    async fn send(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<TokenOutcome>, NotifyError> {
        let mut outcomes = Vec::with_capacity(tokens.len());

        // The legacy gateway has no multicast endpoint; tokens per user
        // are few, so sequential sends are fine here.
        for token in tokens {
            let payload = json!({
                "to": token,
                "title": message.title,
                "body": message.body,
                "data": message.data,
            });

            let result = self
                .client
                .post(&self.endpoint)
                .header("Authorization", format!("key={}", self.api_key))
                .json(&payload)
                .send()
                .await;

            let outcome = match result {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => Err(Self::classify(response.status())),
                Err(e) => Err(DeliveryFailure::Other(e.to_string())),
            };
            outcomes.push(TokenOutcome {
                token: token.clone(),
                result: outcome,
            });
        }

        Ok(outcomes)
    }
}
