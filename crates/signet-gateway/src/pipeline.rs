//! Per-request processing pipeline.
//!
//! One route binds a webhook handler and a pre-resolved signer. Each
//! request runs authenticate → sign → export linearly, with early exits:
//! authentication or signing failures answer 400, a recognized non-event
//! answers 200 without signing or exporting, and any sink failure turns
//! the final status into 500 even when other sinks succeeded. Callers see
//! only the status code; the details stay in server-side logs.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use serde_json::json;
use tracing::{error, info, warn};

use base64::prelude::{Engine, BASE64_STANDARD};
use signet_attestation::{Envelope, Signer, Statement};
use signet_webhook::{Artifact, HandleOutcome, WebhookHandler};

use crate::sink::Sink;

/// One configured webhook endpoint with its bound handler and signer.
pub struct Route {
    name: String,
    handler: Box<dyn WebhookHandler>,
    signer: Arc<dyn Signer>,
    sinks: Arc<Vec<Box<dyn Sink>>>,
}

impl Route {
    /// Binds a route to its handler, signer, and the shared sink set.
    pub fn new(
        name: String,
        handler: Box<dyn WebhookHandler>,
        signer: Arc<dyn Signer>,
        sinks: Arc<Vec<Box<dyn Sink>>>,
    ) -> Self {
        Self {
            name,
            handler,
            signer,
            sinks,
        }
    }

    /// Route name, doubling as the URL path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the pipeline for one buffered request.
    pub async fn process(&self, headers: &HeaderMap, body: Bytes) -> StatusCode {
        info!(webhook = %self.name, bytes = body.len(), "webhook request received");

        let artifact = match self.handler.handle(headers, &body) {
            Ok(HandleOutcome::Event(artifact)) => artifact,
            Ok(HandleOutcome::Ignored) => {
                info!(webhook = %self.name, "event ignored, nothing to attest");
                return StatusCode::OK;
            },
            Err(err) => {
                warn!(webhook = %self.name, error = %err, "request rejected");
                return StatusCode::BAD_REQUEST;
            },
        };

        let envelope = match self.sign(&artifact).await {
            Ok(envelope) => envelope,
            Err(err) => {
                // Reported with the same status as authentication failures;
                // a deliberate compatibility choice.
                warn!(webhook = %self.name, error = %err, "could not sign attestation");
                return StatusCode::BAD_REQUEST;
            },
        };

        self.export(&envelope).await
    }

    /// Exactly one signing operation per request.
    async fn sign(&self, artifact: &Artifact) -> Result<Envelope, signet_attestation::SignError> {
        let statement = Statement::new(
            signet_attestation::WEBHOOK_PREDICATE_TYPE,
            json!({
                "eventType": artifact.event,
                "body": BASE64_STANDARD.encode(&artifact.body),
                "receivedSignature": artifact.received_signature,
            }),
        );
        let payload = statement.to_bytes()?;
        Envelope::sign(&payload, signet_attestation::PAYLOAD_TYPE, self.signer.as_ref()).await
    }

    /// Fans the envelope out to every sink; worst outcome wins.
    async fn export(&self, envelope: &Envelope) -> StatusCode {
        let mut any_failed = false;
        for sink in self.sinks.iter() {
            match sink.store(envelope).await {
                Ok(location) => {
                    info!(webhook = %self.name, sink = sink.name(), %location, "attestation stored");
                },
                Err(err) => {
                    error!(webhook = %self.name, sink = sink.name(), error = %err, "attestation store failed");
                    any_failed = true;
                },
            }
        }

        if any_failed {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("signer", &self.signer.key_id())
            .finish_non_exhaustive()
    }
}
