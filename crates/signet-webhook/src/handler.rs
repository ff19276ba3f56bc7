//! The webhook handler capability.

use bytes::Bytes;
use http::HeaderMap;

use crate::error::WebhookError;

/// Opaque signable artifact produced from one validated webhook event.
///
/// Created per request and consumed once by the signing step. Carries the
/// exact raw body bytes, the declared event type, and the verified
/// signature as evidence.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Raw request body, exactly as received.
    pub body: Bytes,
    /// Declared event type from the source platform.
    pub event: String,
    /// The signature header value that verification accepted.
    pub received_signature: String,
}

/// Result of handling a request that was not rejected.
#[derive(Debug)]
pub enum HandleOutcome {
    /// A validated event ready for signing.
    Event(Artifact),
    /// A recognized non-event, e.g. the platform's liveness probe.
    /// The pipeline responds success without signing or exporting.
    Ignored,
}

/// Validates inbound requests and produces signable artifacts.
///
/// Handlers are built from the provider registry, prepared once at
/// startup, and then shared read-only across concurrent requests.
pub trait WebhookHandler: Send + Sync {
    /// Finishes construction after options have been applied.
    ///
    /// Handlers load secret material and verify preconditions here so a
    /// misconfigured route fails at startup rather than on first request.
    ///
    /// # Errors
    ///
    /// `SecretMissing` / `SecretUnreadable` for handlers that need a
    /// shared secret. Such failures are fatal for the affected route
    /// only; other routes remain servable.
    fn prepare(&mut self) -> Result<(), WebhookError> {
        Ok(())
    }

    /// Decides whether the request is a genuine event from the claimed
    /// source.
    ///
    /// The body has already been read fully and buffered; it is consumed
    /// exactly once. Rejection performs no side effects.
    ///
    /// # Errors
    ///
    /// `AuthenticationFailed` when the request cannot be verified.
    fn handle(&self, headers: &HeaderMap, body: &Bytes) -> Result<HandleOutcome, WebhookError>;
}
