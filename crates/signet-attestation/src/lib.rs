//! Cryptographic signing and envelope format for webhook attestations.
//!
//! Defines the signer capability boundary the gateway calls through, an
//! Ed25519 file-key implementation, the DSSE-shaped signed envelope with
//! its pre-authentication encoding, and content addressing for
//! deterministic sink filenames.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod digest;
pub mod envelope;
pub mod error;
pub mod keypair;
pub mod signer;
pub mod statement;

pub use digest::content_address;
pub use envelope::{pre_auth_encoding, Envelope, EnvelopeSignature};
pub use error::SignError;
pub use keypair::KeyPairSigner;
pub use signer::Signer;
pub use statement::{Statement, PAYLOAD_TYPE, STATEMENT_TYPE, WEBHOOK_PREDICATE_TYPE};
