//! DSSE-shaped signed envelope.
//!
//! The envelope is the wire format written to sinks: a base64 payload,
//! its media type, and one or more signatures computed over the DSSE
//! pre-authentication encoding rather than the raw payload, binding the
//! payload type into the signed material.

use base64::prelude::{Engine, BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::SignError;
use crate::signer::Signer;

/// One signature over an envelope's pre-authentication encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeSignature {
    /// Identifier of the key that produced the signature.
    pub keyid: String,
    /// Base64-encoded signature bytes.
    pub sig: String,
}

/// Signed envelope carrying an attestation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64-encoded payload bytes.
    pub payload: String,
    /// Media type of the decoded payload.
    #[serde(rename = "payloadType")]
    pub payload_type: String,
    /// Signatures over the pre-authentication encoding.
    pub signatures: Vec<EnvelopeSignature>,
}

impl Envelope {
    /// Signs `payload` with `signer` and wraps it into an envelope.
    ///
    /// Performs exactly one signing operation.
    ///
    /// # Errors
    ///
    /// Propagates the signer's failure.
    pub async fn sign(
        payload: &[u8],
        payload_type: &str,
        signer: &dyn Signer,
    ) -> Result<Self, SignError> {
        let pae = pre_auth_encoding(payload_type, payload);
        let signature = signer.sign(&pae).await?;

        Ok(Self {
            payload: BASE64_STANDARD.encode(payload),
            payload_type: payload_type.to_string(),
            signatures: vec![signature],
        })
    }

    /// Serializes the envelope to its canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `SignError::Serialization` if JSON encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SignError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// DSSE v1 pre-authentication encoding.
///
/// `DSSEv1 <len(type)> <type> <len(payload)> <payload>` with ASCII
/// decimal lengths and single-space separators.
pub fn pre_auth_encoding(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let header = format!("DSSEv1 {} {} {} ", payload_type.len(), payload_type, payload.len());
    let mut encoded = Vec::with_capacity(header.len() + payload.len());
    encoded.extend_from_slice(header.as_bytes());
    encoded.extend_from_slice(payload);
    encoded
}
