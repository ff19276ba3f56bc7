//! Remote signing through a Vault transit engine.
//!
//! The transit engine signs over HTTP: `POST
//! {address}/v1/{mount}/sign/{key}` with a base64 input returns a
//! signature of the form `vault:vN:<base64>`. Only the trailing base64
//! part goes into envelopes; the `vault:vN:` prefix identifies the key
//! version server-side.

use async_trait::async_trait;
use base64::prelude::{Engine, BASE64_STANDARD};
use serde::Deserialize;
use tracing::debug;

use signet_attestation::{EnvelopeSignature, SignError, Signer};

use crate::error::SignerError;

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Signer that delegates to a Vault transit key.
///
/// Holds only an HTTP client and immutable connection details, so it is
/// safe to invoke concurrently from multiple requests.
#[derive(Debug)]
pub struct VaultTransitSigner {
    client: reqwest::Client,
    address: String,
    mount: String,
    key_name: String,
    token: String,
    key_id: String,
}

impl VaultTransitSigner {
    /// Builds a transit signer for one named key.
    ///
    /// `key_id` is the full KMS reference (e.g. `vault:my-key`) so
    /// envelopes record which configured key produced the signature.
    ///
    /// # Errors
    ///
    /// Returns `SignerError::Client` if the HTTP client cannot be built.
    pub fn new(
        address: String,
        mount: String,
        key_name: String,
        token: String,
        key_id: String,
    ) -> Result<Self, SignerError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            mount,
            key_name,
            token,
            key_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    data: SignData,
}

#[derive(Debug, Deserialize)]
struct SignData {
    signature: String,
}

#[async_trait]
impl Signer for VaultTransitSigner {
    async fn sign(&self, message: &[u8]) -> Result<EnvelopeSignature, SignError> {
        let url = format!("{}/v1/{}/sign/{}", self.address, self.mount, self.key_name);
        debug!(key = %self.key_name, %url, "requesting vault transit signature");

        let response = self
            .client
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(&serde_json::json!({ "input": BASE64_STANDARD.encode(message) }))
            .send()
            .await
            .map_err(|err| SignError::Remote {
                message: format!("vault request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignError::Remote {
                message: format!("vault returned status {status}"),
            });
        }

        let body: SignResponse = response.json().await.map_err(|err| SignError::Remote {
            message: format!("could not parse vault response: {err}"),
        })?;

        let sig = parse_transit_signature(&body.data.signature)?;
        Ok(EnvelopeSignature {
            keyid: self.key_id.clone(),
            sig,
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// Extracts the base64 signature from `vault:vN:<base64>`.
fn parse_transit_signature(raw: &str) -> Result<String, SignError> {
    let encoded = raw
        .splitn(3, ':')
        .nth(2)
        .ok_or_else(|| SignError::Remote {
            message: format!("unexpected vault signature format: {raw:?}"),
        })?;

    BASE64_STANDARD
        .decode(encoded)
        .map_err(|_| SignError::Remote {
            message: format!("vault signature is not valid base64: {raw:?}"),
        })?;

    Ok(encoded.to_string())
}
