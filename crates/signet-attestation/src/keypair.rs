//! Ed25519 signing from key files.

use std::path::Path;

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::envelope::EnvelopeSignature;
use crate::error::SignError;
use crate::signer::Signer;

/// Ed25519 signer backed by a local keypair.
///
/// Signing is deterministic and the key is immutable after construction,
/// so a single instance is safe to share across concurrent requests.
#[derive(Debug)]
pub struct KeyPairSigner {
    signing_key: SigningKey,
    key_id: String,
}

impl KeyPairSigner {
    /// Generates a fresh random keypair.
    ///
    /// Intended for tests and development; production keys should be
    /// provisioned as files and loaded with [`KeyPairSigner::from_key_file`].
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Builds a signer from raw or hex-encoded Ed25519 key material.
    ///
    /// Accepts either the canonical 32 raw key bytes or their 64-character
    /// hex encoding (surrounding ASCII whitespace tolerated).
    ///
    /// # Errors
    ///
    /// Returns `SignError::InvalidKey` for any other shape.
    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, SignError> {
        if let Ok(raw) = <[u8; 32]>::try_from(bytes) {
            return Ok(Self::from_signing_key(SigningKey::from_bytes(&raw)));
        }

        let text = std::str::from_utf8(bytes)
            .map(str::trim)
            .map_err(|_| SignError::InvalidKey {
                message: format!("expected 32 raw bytes or 64 hex characters, got {} bytes", bytes.len()),
            })?;
        let decoded = hex::decode(text).map_err(|_| SignError::InvalidKey {
            message: format!("expected 32 raw bytes or 64 hex characters, got {} bytes", bytes.len()),
        })?;
        let raw = <[u8; 32]>::try_from(decoded.as_slice()).map_err(|_| SignError::InvalidKey {
            message: format!("hex key decodes to {} bytes, expected 32", decoded.len()),
        })?;

        Ok(Self::from_signing_key(SigningKey::from_bytes(&raw)))
    }

    /// Loads a signer from a key file on disk.
    ///
    /// # Errors
    ///
    /// `SignError::KeyUnreadable` if the file cannot be read,
    /// `SignError::InvalidKey` if its contents are not a usable key.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, SignError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| SignError::KeyUnreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_key_bytes(&bytes)
    }

    /// The public half of the keypair, for signature verification.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let fingerprint = Sha256::digest(signing_key.verifying_key().to_bytes());
        let key_id = hex::encode(fingerprint);
        Self { signing_key, key_id }
    }
}

#[async_trait]
impl Signer for KeyPairSigner {
    async fn sign(&self, message: &[u8]) -> Result<EnvelopeSignature, SignError> {
        use base64::prelude::{Engine, BASE64_STANDARD};

        let signature = self.signing_key.sign(message);
        Ok(EnvelopeSignature {
            keyid: self.key_id.clone(),
            sig: BASE64_STANDARD.encode(signature.to_bytes()),
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
