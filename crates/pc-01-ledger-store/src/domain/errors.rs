//! # Domain Errors
//!
//! Error types for the Ledger Store subsystem.
//!
//! The taxonomy separates caller errors (rejected before any side effect),
//! authorization refusals, integrity findings, and retryable backend
//! failures, because each has a different remediation path.

use shared_types::{EnvelopeError, SignerId, Timestamp};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Payload exceeds the configured absolute limit. Caller error.
    #[error("Payload too large: {size} bytes, max {max}")]
    PayloadTooLarge { size: u64, max: u64 },

    /// A bounded operation was asked for zero results or a zero batch.
    /// Caller error; nothing was queried.
    #[error("Invalid limit: {limit} (must be greater than zero)")]
    InvalidLimit { limit: i64 },

    /// Signer is not authorized at the given time. The block is never
    /// persisted.
    #[error("Signer '{identity}' not authorized at {at}")]
    NotAuthorized { identity: SignerId, at: Timestamp },

    /// No key material is registered for this signer identity.
    #[error("Unknown signer: '{identity}'")]
    UnknownSigner { identity: SignerId },

    /// The sequence counter storage is unavailable; the append was aborted
    /// before any block was constructed. Safe to retry.
    #[error("Sequence counter unavailable: {message}")]
    SequenceUnavailable { message: String },

    /// The signing provider refused or failed. The reserved number is lost
    /// (gap), never reused.
    #[error("Signing failed for '{identity}': {message}")]
    SigningFailed { identity: SignerId, message: String },

    /// No block with this sequence number.
    #[error("Block not found at sequence {sequence}")]
    BlockNotFound { sequence: u64 },

    /// No block with this content hash.
    #[error("Block not found for hash {hash_prefix}")]
    HashNotFound { hash_prefix: String },

    /// Stored record failed its CRC32 integrity check.
    #[error("Record corruption at sequence {sequence}: expected checksum {expected}, got {actual}")]
    RecordCorruption {
        sequence: u64,
        expected: u32,
        actual: u32,
    },

    /// An envelope update attempted to change a hash-critical field. The
    /// stored block is unchanged.
    #[error("Update rejected: hash-critical fields of block {sequence} are immutable")]
    ImmutableFieldMutation { sequence: u64 },

    /// Envelope boundary violation.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// Persistence backend failure. Retryable; shared state is unchanged.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Off-chain blob store failure.
    #[error("Blob store error: {message}")]
    BlobStore { message: String },

    /// Record serialization failure.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Persistence backend errors.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// I/O failure during read or write.
    #[error("Backend I/O error: {message}")]
    Io { message: String },

    /// The backend is unavailable (connection lost, store closed).
    #[error("Backend unavailable: {message}")]
    Unavailable { message: String },

    /// Stored bytes could not be decoded.
    #[error("Backend corruption: {message}")]
    Corruption { message: String },
}

impl From<BackendError> for LedgerError {
    fn from(err: BackendError) -> Self {
        LedgerError::Backend {
            message: err.to_string(),
        }
    }
}

/// Off-chain blob store errors.
#[derive(Debug, Clone, Error)]
pub enum BlobError {
    /// No blob for this reference token.
    #[error("Blob not found for token '{token}'")]
    NotFound { token: String },

    /// Retrieved bytes do not match the reference digest.
    #[error("Blob integrity failure for token '{token}'")]
    IntegrityFailure { token: String },

    /// Store I/O failure.
    #[error("Blob store I/O error: {message}")]
    Io { message: String },
}

impl From<BlobError> for LedgerError {
    fn from(err: BlobError) -> Self {
        LedgerError::BlobStore {
            message: err.to_string(),
        }
    }
}

/// Signing provider errors.
#[derive(Debug, Clone, Error)]
pub enum SigningError {
    /// No private key material for this identity.
    #[error("No key material for '{identity}'")]
    NoKeyMaterial { identity: SignerId },

    /// The provider failed to produce a signature.
    #[error("Provider failure: {message}")]
    ProviderFailure { message: String },
}
