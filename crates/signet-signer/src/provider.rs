//! The signer provider capability.

use std::sync::Arc;

use async_trait::async_trait;

use signet_attestation::Signer;
use signet_registry::Composite;

use crate::error::SignerError;

/// Resolves a configured signer once per route at startup.
///
/// Providers are built by the registry from untyped configuration; the
/// signer itself is constructed exactly once and then shared across
/// concurrent requests, so construction failures surface at startup
/// rather than at request time.
#[async_trait]
pub trait SignerProvider: Send + Sync {
    /// Builds the signer this provider was configured for.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] when key material or backend credentials
    /// cannot be resolved. Fatal for the affected route's startup only.
    async fn signer(&self) -> Result<Arc<dyn Signer>, SignerError>;

    /// Probes for the composite-provider capability.
    ///
    /// Providers whose backend options live one configuration layer down
    /// return `Some`; the gateway then forwards the nested options after
    /// the provider itself is built. The default is `None`.
    fn as_composite_mut(&mut self) -> Option<&mut dyn Composite> {
        None
    }
}
