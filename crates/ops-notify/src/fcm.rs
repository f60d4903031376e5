// fcm.rs — Managed-credential multicast sender (preferred transport).
//
// Used when process-wide messaging credentials are configured. One POST
// carries the whole token set; the provider answers with a result entry
// per token, in order.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::NotifyError;
use crate::transport::{DeliveryFailure, PushMessage, PushTransport, TokenOutcome};

const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Multicast sender authenticated by managed messaging credentials.
pub struct FcmTransport {
    client: reqwest::Client,
    endpoint: String,
    credential: String,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    #[serde(default)]
    error: Option<String>,
}

impl FcmTransport {
    pub fn new(credential: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_endpoint(credential, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(
        credential: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credential: credential.into(),
        })
    }

    /// Translate the provider's error vocabulary into canonical kinds.
    fn classify(error: &str) -> DeliveryFailure {
        match error {
            "InvalidRegistration" | "InvalidArgument" => DeliveryFailure::InvalidToken,
            "NotRegistered" | "Unregistered" => DeliveryFailure::UnregisteredToken,
            other => DeliveryFailure::Other(other.to_string()),
        }
    }
}

#[async_trait]
impl PushTransport for FcmTransport {
    fn name(&self) -> &'static str {
        "fcm"
    }

    async fn send(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<TokenOutcome>, NotifyError> {
        let payload = json!({
            "registration_ids": tokens,
            "notification": { "title": message.title, "body": message.body },
            "data": message.data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.credential))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected(format!("{status}: {body}")));
        }

        let parsed: FcmResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::MalformedResponse(e.to_string()))?;
        if parsed.results.len() != tokens.len() {
            return Err(NotifyError::MalformedResponse(format!(
                "expected {} results, got {}",
                tokens.len(),
                parsed.results.len()
            )));
        }

        Ok(tokens
            .iter()
            .zip(parsed.results)
            .map(|(token, result)| TokenOutcome {
                token: token.clone(),
                result: match result.error {
                    None => Ok(()),
                    Some(error) => Err(Self::classify(&error)),
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_vocabulary_maps_to_canonical_kinds() {
        assert_eq!(
            FcmTransport::classify("NotRegistered"),
            DeliveryFailure::UnregisteredToken
        );
        assert_eq!(
            FcmTransport::classify("InvalidRegistration"),
            DeliveryFailure::InvalidToken
        );
        assert!(matches!(
            FcmTransport::classify("InternalServerError"),
            DeliveryFailure::Other(_)
        ));
    }
}
