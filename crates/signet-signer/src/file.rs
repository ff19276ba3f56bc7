//! Signer provider backed by a local Ed25519 key file.

use std::sync::Arc;

use async_trait::async_trait;

use signet_attestation::{KeyPairSigner, Signer};
use signet_registry::{ConfigOption, RegistryError};

use crate::error::SignerError;
use crate::provider::SignerProvider;
use crate::SignerRegistry;

/// Provider that loads an Ed25519 signing key from disk.
#[derive(Debug, Default)]
pub struct FileSignerProvider {
    key_path: String,
}

/// Registers the `file` provider type.
pub(crate) fn register(registry: &mut SignerRegistry) -> Result<(), RegistryError> {
    registry.register(
        "file",
        FileSignerProvider::default,
        vec![ConfigOption::string(
            "key-path",
            "Path to the Ed25519 signing key (32 raw bytes or 64 hex characters)",
            "",
            |provider: &mut FileSignerProvider, value| {
                provider.key_path = value;
                Ok(())
            },
        )],
        |provider| Box::new(provider) as Box<dyn SignerProvider>,
    )
}

#[async_trait]
impl SignerProvider for FileSignerProvider {
    async fn signer(&self) -> Result<Arc<dyn Signer>, SignerError> {
        if self.key_path.is_empty() {
            return Err(SignerError::KeyMissing);
        }

        let signer = KeyPairSigner::from_key_file(&self.key_path)?;
        Ok(Arc::new(signer))
    }
}
