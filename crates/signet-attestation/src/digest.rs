//! Content addressing for serialized envelopes.

use sha2::{Digest, Sha256};

/// Computes the content address of serialized bytes.
///
/// A stable, deterministic identifier: the lowercase hex SHA-256 digest.
/// The local sink derives filenames from it so repeated writes of the
/// same envelope land on the same path.
pub fn content_address(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
