//! Startup errors for gateway assembly.
//!
//! Everything here is fatal before the process begins serving. Per-route
//! secret and key-material failures are deliberately not represented:
//! those are logged and the route is skipped so other routes stay
//! servable.

use signet_registry::RegistryError;
use thiserror::Error;

/// Errors from assembling the gateway out of configuration.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A route's provider configuration was rejected by the registry.
    #[error("invalid configuration for webhook {name:?}: {source}")]
    Configuration {
        /// Route name from configuration.
        name: String,
        /// Underlying registry failure.
        #[source]
        source: RegistryError,
    },

    /// A route name cannot be used as a URL path segment.
    #[error("webhook name {name:?} is not a valid path segment")]
    InvalidRouteName {
        /// Offending route name.
        name: String,
    },

    /// The configured attestation directory failed its write probe.
    #[error("attestation directory {path} is not writable: {source}")]
    UnwritableDirectory {
        /// Directory that was probed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archive HTTP client could not be constructed.
    #[error("could not build archive client: {source}")]
    ArchiveClient {
        /// Underlying client construction error.
        #[from]
        source: reqwest::Error,
    },
}
