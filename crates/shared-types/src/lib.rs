//! # Shared Types
//!
//! Domain entities shared across all Permachain subsystems. This crate is
//! the Single Source of Truth for the ledger data model:
//!
//! - [`Block`] and its write-once header, payload, and signature
//! - [`MetadataEnvelope`], the only block field group mutable after commit
//! - [`AuthorizedSigner`], the historical identity-to-key binding
//! - [`ContentReference`], the opaque token for off-chain payloads
//!
//! ## Immutability Model
//!
//! Seven fields participate in a block's content hash and are frozen at
//! commit time: sequence, previous hash, timestamp, signer identity,
//! payload, content hash, and signature. Every mutation path in the
//! workspace funnels through [`Block::immutable_fields_match`] before
//! touching a stored block.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod signer;

pub use entities::{
    Block, BlockHeader, BlockPayload, ContentReference, Hash, Signature, SignerId, Timestamp,
    GENESIS_PARENT_HASH,
};
pub use envelope::{EnvelopeLimits, MetadataEnvelope};
pub use errors::EnvelopeError;
pub use signer::AuthorizedSigner;

/// Render the leading bytes of a hash for log lines.
pub fn short_hash(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}
