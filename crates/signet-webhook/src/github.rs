//! GitHub webhook handler with HMAC-SHA256 verification.
//!
//! GitHub signs each delivery by computing HMAC-SHA256 over the raw body
//! with the webhook's shared secret and sending the hex digest in the
//! `X-Hub-Signature-256` header, prefixed `sha256=`. Verification
//! recomputes the digest over the exact body bytes and compares in
//! constant time.
//!
//! Ping events (`X-GitHub-Event: ping`) are GitHub's reachability probe
//! and short-circuit to an ignored outcome before signature verification,
//! matching the platform's expectation that a freshly created hook
//! answers its ping.

use bytes::Bytes;
use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha2::Sha256;
use tracing::debug;

use signet_registry::{ConfigOption, RegistryError};

use crate::error::WebhookError;
use crate::handler::{Artifact, HandleOutcome, WebhookHandler};
use crate::HandlerRegistry;

type HmacSha256 = Hmac<Sha256>;

const EVENT_HEADER: &str = "x-github-event";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";
const SIGNATURE_PREFIX: &str = "sha256=";
const PING_EVENT: &str = "ping";

/// Webhook handler for GitHub event deliveries.
#[derive(Debug, Default)]
pub struct GithubHandler {
    secret_file: String,
    secret: Vec<u8>,
}

/// Registers the `github` handler type.
pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<(), RegistryError> {
    registry.register(
        "github",
        GithubHandler::default,
        vec![ConfigOption::string(
            "secret-file-path",
            "Path to the file containing the GitHub webhook secret",
            "",
            |handler: &mut GithubHandler, value| {
                handler.secret_file = value;
                Ok(())
            },
        )],
        |handler| Box::new(handler) as Box<dyn WebhookHandler>,
    )
}

impl WebhookHandler for GithubHandler {
    fn prepare(&mut self) -> Result<(), WebhookError> {
        if self.secret_file.is_empty() {
            return Err(WebhookError::SecretMissing);
        }

        self.secret = std::fs::read(&self.secret_file).map_err(|source| {
            WebhookError::SecretUnreadable {
                path: self.secret_file.clone(),
                source,
            }
        })?;
        Ok(())
    }

    fn handle(&self, headers: &HeaderMap, body: &Bytes) -> Result<HandleOutcome, WebhookError> {
        let event = headers
            .get(EVENT_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if event == PING_EVENT {
            debug!("received github ping event");
            return Ok(HandleOutcome::Ignored);
        }

        let received = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(WebhookError::AuthenticationFailed {
                reason: "missing signature header",
            })?;

        let hex_digest = received.strip_prefix(SIGNATURE_PREFIX).ok_or(
            WebhookError::AuthenticationFailed {
                reason: "malformed signature header",
            },
        )?;

        let expected = expected_signature(&self.secret, body)?;
        if !timing_safe_eq(hex_digest, &expected) {
            return Err(WebhookError::AuthenticationFailed {
                reason: "signature mismatch",
            });
        }

        Ok(HandleOutcome::Event(Artifact {
            body: body.clone(),
            event: event.to_string(),
            received_signature: received.to_string(),
        }))
    }
}

/// Hex HMAC-SHA256 of the raw body under the shared secret.
fn expected_signature(secret: &[u8], body: &[u8]) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| {
        WebhookError::AuthenticationFailed {
            reason: "invalid hmac key",
        }
    })?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time string comparison.
///
/// Avoids leaking the expected digest through timing analysis.
fn timing_safe_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.as_bytes().iter().zip(b.as_bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
