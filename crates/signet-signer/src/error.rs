//! Error types for signer resolution.

use signet_attestation::SignError;
use thiserror::Error;

/// Errors from building a signer out of a configured provider.
///
/// These occur once per route at process startup; a failing route is
/// skipped with an error log while other routes remain servable.
#[derive(Debug, Error)]
pub enum SignerError {
    /// No key file was configured for the `file` provider.
    #[error("no signer key file configured")]
    KeyMissing,

    /// The key material was unreadable or invalid.
    #[error(transparent)]
    Key(#[from] SignError),

    /// The KMS key reference has no recognizable `<scheme>:<name>` shape.
    #[error("kms reference {reference:?} is malformed, expected <backend>:<key-name>")]
    MalformedReference {
        /// The offending reference value.
        reference: String,
    },

    /// The KMS reference names a backend this build does not support.
    #[error("unsupported kms backend {scheme:?}")]
    UnsupportedBackend {
        /// Scheme taken from the reference.
        scheme: String,
    },

    /// The backend's credential file could not be read.
    #[error("could not read credential from {path}: {source}")]
    CredentialUnreadable {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No credential was configured for a backend that requires one.
    #[error("no credential configured for kms backend {scheme:?}")]
    CredentialMissing {
        /// Backend that required the credential.
        scheme: String,
    },

    /// The backend's HTTP client could not be constructed.
    #[error("could not build kms http client: {source}")]
    Client {
        /// Underlying client construction error.
        #[from]
        source: reqwest::Error,
    },
}
