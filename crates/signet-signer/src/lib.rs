//! Signer providers for the attestation gateway.
//!
//! Providers are registry-built factories that resolve a route's signer
//! once at startup: `file` loads an Ed25519 key from disk, and the
//! composite `kms` provider fronts remote signing backends whose options
//! are forwarded through the nested-configuration protocol.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod file;
pub mod kms;
pub mod provider;
pub mod vault;

pub use error::SignerError;
pub use provider::SignerProvider;

use signet_registry::{Registry, RegistryError};

/// Registry type holding signer provider implementations.
pub type SignerRegistry = Registry<Box<dyn SignerProvider>>;

/// Registers every built-in signer provider.
///
/// The explicit bootstrap list keeps registration order deterministic
/// and lets tests assemble registries in isolation.
///
/// # Errors
///
/// Propagates registration failures, which indicate bootstrap bugs.
pub fn register_builtin_providers(registry: &mut SignerRegistry) -> Result<(), RegistryError> {
    file::register(registry)?;
    kms::register(registry)
}
