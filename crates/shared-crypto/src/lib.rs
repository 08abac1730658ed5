//! # Shared Crypto - Cryptographic Primitives
//!
//! The cryptographic provider consumed by the ledger core. Pure functions,
//! no state.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Content hashing, key derivation |
//! | `signatures` | Ed25519 | Block signing and verification |
//! | `symmetric` | XChaCha20-Poly1305 | Private metadata layers, annotations |
//!
//! ## Security Properties
//!
//! - **BLAKE3**: SIMD-accelerated, keyed mode and derive_key built in
//! - **Ed25519**: deterministic nonces, no RNG dependency when signing
//! - **XChaCha20-Poly1305**: authenticated (tamper-evident), 192-bit nonce
//!
//! The symmetric module offers two sealing modes: random-nonce `seal` for
//! general use, and derived-nonce `seal_deterministic` for the metadata
//! layer path, where regenerating a layer from the same inputs must produce
//! byte-for-byte identical ciphertext.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{blake3_derive_key, blake3_hash, blake3_hash_many, Blake3Hasher};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use symmetric::{open, seal, seal_deterministic, LayerKey, Nonce};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
