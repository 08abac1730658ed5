//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong key, wrong nonce, or tampered ciphertext)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Ciphertext too short to carry its nonce prefix
    #[error("Ciphertext truncated: {len} bytes, need at least {min}")]
    CiphertextTruncated {
        /// Actual ciphertext length in bytes
        len: usize,
        /// Minimum length including the nonce prefix
        min: usize,
    },

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,
}
