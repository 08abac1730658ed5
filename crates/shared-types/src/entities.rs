//! # Domain Entities
//!
//! Core ledger entities: blocks, headers, payloads, and signatures.
//!
//! ## Hashing
//!
//! A block's content hash is computed over a canonical preimage of the
//! header plus the payload bytes (for off-chain payloads, the reference
//! token is hashed, never the blob itself). The preimage is assembled
//! field-by-field with fixed-width little-endian integers so it is
//! identical across platforms and serde versions.

use crate::envelope::MetadataEnvelope;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// 256-bit hash digest.
pub type Hash = [u8; 32];

/// Unix timestamp in seconds since epoch.
pub type Timestamp = u64;

/// Signer identity label, unique per authorized signer.
pub type SignerId = String;

/// Previous-hash sentinel for the first block of a ledger.
pub const GENESIS_PARENT_HASH: Hash = [0u8; 32];

/// Write-once block header. Every field participates in the content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Monotonic, unique, gap-tolerant sequence number.
    pub sequence: u64,
    /// Content hash of the preceding block, or [`GENESIS_PARENT_HASH`].
    pub previous_hash: Hash,
    /// Commit timestamp assigned by the ledger's time source.
    pub timestamp: Timestamp,
    /// Identity of the signer that produced this block.
    pub signer: SignerId,
}

/// Block payload: inline bytes, or an opaque reference when the payload
/// exceeded the inline threshold and lives in the off-chain blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockPayload {
    /// Raw bytes stored on-ledger.
    Inline(Vec<u8>),
    /// Off-chain reference; the reference (not the blob) is hashed.
    External(ContentReference),
}

impl BlockPayload {
    /// Bytes that enter the content-hash preimage for this payload.
    pub fn preimage_bytes(&self) -> Vec<u8> {
        match self {
            BlockPayload::Inline(bytes) => {
                let mut out = Vec::with_capacity(1 + bytes.len());
                out.push(0u8);
                out.extend_from_slice(bytes);
                out
            }
            BlockPayload::External(reference) => {
                let mut out = Vec::with_capacity(1 + 40 + reference.token.len());
                out.push(1u8);
                out.extend_from_slice(reference.token.as_bytes());
                out.extend_from_slice(&reference.size.to_le_bytes());
                out.extend_from_slice(&reference.digest);
                out
            }
        }
    }

    /// Inline payload length, or the recorded size of the external blob.
    pub fn len(&self) -> u64 {
        match self {
            BlockPayload::Inline(bytes) => bytes.len() as u64,
            BlockPayload::External(reference) => reference.size,
        }
    }

    /// True when the payload is zero-length.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Opaque handle to a payload stored in the external blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    /// Store-assigned token; treated as opaque by the ledger core.
    pub token: String,
    /// Size of the referenced blob in bytes.
    pub size: u64,
    /// Digest of the referenced blob for integrity verification.
    pub digest: Hash,
}

/// Ed25519 signature over a block's content hash.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde_as(as = "serde_with::Bytes")] pub [u8; 64]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// One immutable, sequenced, hash-linked, signed ledger entry plus its
/// mutable metadata envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Write-once header.
    pub header: BlockHeader,
    /// Write-once payload (inline or off-chain reference).
    pub payload: BlockPayload,
    /// Hash over the canonical header+payload preimage.
    pub content_hash: Hash,
    /// Signature over `content_hash` by `header.signer`.
    pub signature: Signature,
    /// The only field group mutable after commit.
    pub envelope: MetadataEnvelope,
}

impl Block {
    /// Canonical byte preimage the content hash is computed over.
    ///
    /// Fixed-width little-endian integers and length-prefixed strings keep
    /// the preimage stable across platforms.
    pub fn content_preimage(header: &BlockHeader, payload: &BlockPayload) -> Vec<u8> {
        let signer_bytes = header.signer.as_bytes();
        let payload_bytes = payload.preimage_bytes();
        let mut out = Vec::with_capacity(8 + 32 + 8 + 4 + signer_bytes.len() + payload_bytes.len());
        out.extend_from_slice(&header.sequence.to_le_bytes());
        out.extend_from_slice(&header.previous_hash);
        out.extend_from_slice(&header.timestamp.to_le_bytes());
        out.extend_from_slice(&(signer_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(signer_bytes);
        out.extend_from_slice(&payload_bytes);
        out
    }

    /// Block sequence number.
    pub fn sequence(&self) -> u64 {
        self.header.sequence
    }

    /// True when every hash-critical field of `candidate` matches `self`.
    ///
    /// The envelope is deliberately excluded: it is the only field group an
    /// update may change.
    pub fn immutable_fields_match(&self, candidate: &Block) -> bool {
        self.header == candidate.header
            && self.payload == candidate.payload
            && self.content_hash == candidate.content_hash
            && self.signature == candidate.signature
    }
}
