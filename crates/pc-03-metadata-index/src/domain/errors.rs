//! # Domain Errors
//!
//! Error types for metadata generation and indexing coordination.

use thiserror::Error;

/// Errors from layer generation or index operations.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// Layer encryption or decryption failed.
    #[error("Layer crypto failure: {message}")]
    Crypto { message: String },

    /// The private layer did not decrypt with the supplied key (wrong key
    /// or tampered ciphertext).
    #[error("Private layer decryption failed")]
    DecryptionFailed,

    /// Layer serialization failure.
    #[error("Layer serialization error: {message}")]
    Serialization { message: String },

    /// The index store is unavailable. Retryable; the block stays in a
    /// retryable state.
    #[error("Index store unavailable: {message}")]
    StoreUnavailable { message: String },
}

impl From<shared_crypto::CryptoError> for IndexError {
    fn from(err: shared_crypto::CryptoError) -> Self {
        match err {
            shared_crypto::CryptoError::DecryptionFailed(_)
            | shared_crypto::CryptoError::CiphertextTruncated { .. } => {
                IndexError::DecryptionFailed
            }
            other => IndexError::Crypto {
                message: other.to_string(),
            },
        }
    }
}
