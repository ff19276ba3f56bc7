//! Composite KMS signer provider.
//!
//! The `kms` provider fronts multiple remote signing backends. Its only
//! top-level option is the key reference; the backend is chosen by the
//! reference's scheme, and each backend's own options live one
//! configuration layer below the provider's, keyed in the flat config map
//! by a `"<scheme>-"` prefix. The gateway forwards those through
//! [`signet_registry::forward_backend_options`] after the provider is
//! built.

use std::sync::Arc;

use async_trait::async_trait;

use signet_attestation::Signer;
use signet_registry::{
    apply_config_options, Composite, ConfigMap, ConfigOption, RegistryError,
};

use crate::error::SignerError;
use crate::provider::SignerProvider;
use crate::vault::VaultTransitSigner;
use crate::SignerRegistry;

/// Option-set family prefix for backend lookups (`kms-<selector>`).
const BACKEND_FAMILY: &str = "kms";

const VAULT_SCHEME: &str = "vault";

/// Signer provider that fronts scheme-selected remote backends.
#[derive(Debug, Default)]
pub struct KmsSignerProvider {
    /// Key reference, e.g. `vault:my-signing-key`.
    reference: String,
    vault: VaultBackend,
}

/// Connection options for the Vault transit backend.
#[derive(Debug, Default)]
struct VaultBackend {
    address: String,
    token_file: String,
    mount: String,
}

/// Registers the `kms` provider type.
pub(crate) fn register(registry: &mut SignerRegistry) -> Result<(), RegistryError> {
    registry.register_composite(
        "kms",
        KmsSignerProvider::default,
        vec![ConfigOption::string(
            "ref",
            "KMS key reference in the form <backend>:<key-name>, e.g. vault:my-key",
            "",
            |provider: &mut KmsSignerProvider, value| {
                provider.reference = value;
                Ok(())
            },
        )],
        |provider| Box::new(provider) as Box<dyn SignerProvider>,
    )
}

/// Declared options of the `kms-vault` backend set.
fn vault_backend_options() -> Vec<ConfigOption<KmsSignerProvider>> {
    vec![
        ConfigOption::string(
            "address",
            "Base URL of the Vault server",
            "https://127.0.0.1:8200",
            |provider: &mut KmsSignerProvider, value| {
                provider.vault.address = value;
                Ok(())
            },
        ),
        ConfigOption::string(
            "token-file",
            "Path to the file containing the Vault token",
            "",
            |provider: &mut KmsSignerProvider, value| {
                provider.vault.token_file = value;
                Ok(())
            },
        ),
        ConfigOption::string(
            "mount",
            "Mount path of the transit secrets engine",
            "transit",
            |provider: &mut KmsSignerProvider, value| {
                provider.vault.mount = value;
                Ok(())
            },
        ),
    ]
}

impl KmsSignerProvider {
    /// Splits the reference into `(scheme, key_name)`.
    fn parse_reference(&self) -> Result<(&str, &str), SignerError> {
        self.reference
            .split_once(':')
            .filter(|(scheme, key)| !scheme.is_empty() && !key.is_empty())
            .ok_or_else(|| SignerError::MalformedReference {
                reference: self.reference.clone(),
            })
    }

    fn vault_signer(&self, key_name: &str) -> Result<Arc<dyn Signer>, SignerError> {
        if self.vault.token_file.is_empty() {
            return Err(SignerError::CredentialMissing {
                scheme: VAULT_SCHEME.to_string(),
            });
        }

        let token = std::fs::read_to_string(&self.vault.token_file).map_err(|source| {
            SignerError::CredentialUnreadable {
                path: self.vault.token_file.clone(),
                source,
            }
        })?;

        let signer = VaultTransitSigner::new(
            self.vault.address.clone(),
            self.vault.mount.clone(),
            key_name.to_string(),
            token.trim().to_string(),
            self.reference.clone(),
        )?;
        Ok(Arc::new(signer))
    }
}

impl Composite for KmsSignerProvider {
    fn backend_selector(&self) -> Option<String> {
        if self.reference.is_empty() {
            return None;
        }
        Some(
            self.reference
                .split(':')
                .next()
                .unwrap_or_default()
                .to_string(),
        )
    }

    fn configure_backend(
        &mut self,
        selector: &str,
        scoped: &ConfigMap,
    ) -> Result<(), RegistryError> {
        let backend = format!("{BACKEND_FAMILY}-{selector}");
        match selector {
            VAULT_SCHEME => {
                apply_config_options(self, &vault_backend_options(), scoped, &backend)
            },
            _ => Err(RegistryError::UnknownBackend { backend }),
        }
    }
}

#[async_trait]
impl SignerProvider for KmsSignerProvider {
    async fn signer(&self) -> Result<Arc<dyn Signer>, SignerError> {
        let (scheme, key_name) = self.parse_reference()?;
        match scheme {
            VAULT_SCHEME => self.vault_signer(key_name),
            other => Err(SignerError::UnsupportedBackend {
                scheme: other.to_string(),
            }),
        }
    }

    fn as_composite_mut(&mut self) -> Option<&mut dyn Composite> {
        Some(self)
    }
}
