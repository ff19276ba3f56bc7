//! The signer capability boundary.

use async_trait::async_trait;

use crate::envelope::EnvelopeSignature;
use crate::error::SignError;

/// Produces cryptographic signatures over arbitrary bytes.
///
/// The gateway resolves one signer per route at startup and invokes it
/// concurrently from request tasks, so implementations must be safe for
/// concurrent use without external locking: either stateless or
/// internally synchronized. Key management and the signing primitives
/// themselves live behind this boundary.
#[async_trait]
pub trait Signer: std::fmt::Debug + Send + Sync {
    /// Signs `message` and returns the signature with its key id.
    ///
    /// # Errors
    ///
    /// Returns [`SignError`] when the signature cannot be produced, e.g.
    /// a remote signing service is unreachable.
    async fn sign(&self, message: &[u8]) -> Result<EnvelopeSignature, SignError>;

    /// Stable identifier of the signing key, carried in envelopes.
    fn key_id(&self) -> &str;
}
