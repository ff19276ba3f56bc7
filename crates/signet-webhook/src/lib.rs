//! Webhook authenticity verification.
//!
//! Defines the handler capability that turns a raw inbound request into a
//! signable artifact (or rejects it), plus the GitHub HMAC reference
//! handler and the explicit registration bootstrap for the provider
//! registry.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod github;
pub mod handler;

pub use error::WebhookError;
pub use handler::{Artifact, HandleOutcome, WebhookHandler};

use signet_registry::{Registry, RegistryError};

/// Registry type holding webhook handler implementations.
pub type HandlerRegistry = Registry<Box<dyn WebhookHandler>>;

/// Registers every built-in webhook handler.
///
/// The explicit bootstrap list keeps registration order deterministic
/// and lets tests assemble registries in isolation.
///
/// # Errors
///
/// Propagates registration failures, which indicate bootstrap bugs.
pub fn register_builtin_handlers(registry: &mut HandlerRegistry) -> Result<(), RegistryError> {
    github::register(registry)
}
