//! Error types for webhook validation.

use thiserror::Error;

/// Errors from constructing or running a webhook handler.
///
/// Authentication failures surface to callers only as an HTTP status;
/// the reason strings here are for server-side logs.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The request could not be authenticated as a genuine event.
    #[error("webhook authentication failed: {reason}")]
    AuthenticationFailed {
        /// Why verification rejected the request.
        reason: &'static str,
    },

    /// No secret file was configured for a handler that requires one.
    #[error("no webhook secret file configured")]
    SecretMissing,

    /// The configured secret file could not be read.
    #[error("could not read webhook secret from {path}: {source}")]
    SecretUnreadable {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
