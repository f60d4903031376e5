// transport.rs — PushTransport trait and per-token delivery outcomes.
//
// Two providers sit behind this trait (managed-credential multicast and
// the legacy HTTP-key sender). Each provider has its own error
// vocabulary; transports translate it into the two canonical dead-
// registration kinds so the dispatcher can prune tokens without knowing
// which provider is configured.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::NotifyError;

/// One notification as handed to a transport.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Auxiliary payload forwarded verbatim to the device.
    pub data: Value,
}

/// Canonical per-token failure kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The registration token is malformed or not acceptable to the
    /// provider (`InvalidRegistration`, `INVALID_ARGUMENT`, HTTP 400).
    InvalidToken,
    /// The device uninstalled or rotated its registration
    /// (`NotRegistered`, `UNREGISTERED`, HTTP 404/410).
    UnregisteredToken,
    /// Anything else — transient or provider-internal.
    Other(String),
}

impl DeliveryFailure {
    /// Whether the registration is permanently dead and should be pruned.
    pub fn is_dead_registration(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::UnregisteredToken)
    }
}

/// Outcome of delivering one message to one registration token.
#[derive(Debug, Clone)]
pub struct TokenOutcome {
    pub token: String,
    pub result: Result<(), DeliveryFailure>,
}

/// A push delivery provider.
///
/// `send` reports per-token success/failure; it only returns `Err` when
/// the call as a whole could not be made (unreachable endpoint, rejected
/// credentials).
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Provider identity for logs.
    fn name(&self) -> &'static str;

    /// Deliver one message to a set of registration tokens.
    async fn send(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<TokenOutcome>, NotifyError>;
}
