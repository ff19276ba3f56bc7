//! In-toto style statement wrapping a webhook predicate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SignError;

/// Statement envelope `_type`.
pub const STATEMENT_TYPE: &str = "https://in-toto.io/Statement/v0.1";

/// Media type carried in envelope `payloadType`.
pub const PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// Predicate type for verified webhook events.
pub const WEBHOOK_PREDICATE_TYPE: &str = "https://signet.dev/attestations/webhook/v0.1";

/// Attestation statement with an opaque predicate.
///
/// The statement is the envelope payload: it names what kind of claim is
/// being made (`predicate_type`) and carries the claim body produced from
/// a validated webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement schema identifier.
    #[serde(rename = "_type")]
    pub statement_type: String,
    /// Identifies the predicate's schema.
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
    /// The claim body.
    pub predicate: Value,
}

impl Statement {
    /// Builds a statement for the given predicate.
    pub fn new(predicate_type: &str, predicate: Value) -> Self {
        Self {
            statement_type: STATEMENT_TYPE.to_string(),
            predicate_type: predicate_type.to_string(),
            predicate,
        }
    }

    /// Serializes the statement to JSON bytes for signing.
    ///
    /// # Errors
    ///
    /// Returns `SignError::Serialization` if JSON encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SignError> {
        Ok(serde_json::to_vec(self)?)
    }
}
