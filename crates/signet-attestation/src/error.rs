//! Error types for signing operations.

use thiserror::Error;

/// Errors that can occur while producing a signature or envelope.
#[derive(Debug, Error)]
pub enum SignError {
    /// Key material could not be parsed as a usable signing key.
    #[error("invalid signing key: {message}")]
    InvalidKey {
        /// Explanation of the format problem.
        message: String,
    },

    /// Key material could not be read from disk.
    #[error("could not read signing key from {path}: {source}")]
    KeyUnreadable {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A remote signing service rejected or failed the request.
    #[error("remote signing failed: {message}")]
    Remote {
        /// Explanation from the remote call.
        message: String,
    },

    /// JSON serialization of a payload or envelope failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
