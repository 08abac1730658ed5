//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 authenticated encryption for private metadata layers
//! and encrypted annotations.
//!
//! Ciphertexts are self-contained: the 24-byte nonce is prepended, so a
//! stored layer is `nonce || aead_ciphertext` and `open` needs only the key.
//!
//! ## Determinism
//!
//! `seal` draws a random nonce and is the right call for general payloads.
//! `seal_deterministic` derives the nonce from the key and a caller-supplied
//! binding (the block hash, for metadata layers), so regenerating a layer
//! from identical inputs yields identical bytes. A fixed (key, nonce) pair
//! is reused only ever for the one plaintext those inputs determine, which
//! keeps the derived-nonce mode inside the AEAD's safety contract.

use crate::hashing::blake3_derive_key;
use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroize;

/// Nonce length in bytes (XChaCha20).
pub const NONCE_LEN: usize = 24;

/// Symmetric key (256-bit), zeroized on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct LayerKey([u8; 32]);

impl LayerKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Derive a sub-key bound to `binding` (e.g. block hash + signer id).
    pub fn derive(&self, context: &str, binding: &[u8]) -> Self {
        let mut material = Vec::with_capacity(32 + binding.len());
        material.extend_from_slice(&self.0);
        material.extend_from_slice(binding);
        let derived = blake3_derive_key(context, &material);
        material.zeroize();
        Self(derived)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Nonce for encryption.
#[derive(Clone)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate random nonce (safe with XChaCha20's 192-bit nonce space).
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Derive a nonce from key material and a binding value.
    pub fn derive(key: &LayerKey, binding: &[u8]) -> Self {
        let mut material = Vec::with_capacity(32 + binding.len());
        material.extend_from_slice(key.as_bytes());
        material.extend_from_slice(binding);
        let digest = blake3_derive_key("permachain layer nonce v1", &material);
        material.zeroize();
        let mut bytes = [0u8; NONCE_LEN];
        bytes.copy_from_slice(&digest[..NONCE_LEN]);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

fn seal_with_nonce(
    key: &LayerKey,
    nonce: Nonce,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Encrypt with a random nonce. Returns `nonce || ciphertext`.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn seal(key: &LayerKey, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    seal_with_nonce(key, Nonce::generate(), plaintext)
}

/// Encrypt with a nonce derived from the key and `binding`.
///
/// Identical (key, binding, plaintext) inputs produce identical output
/// bytes. Callers must ensure the binding uniquely determines the
/// plaintext; the metadata layer path binds to the block content hash.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn seal_deterministic(
    key: &LayerKey,
    binding: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    seal_with_nonce(key, Nonce::derive(key, binding), plaintext)
}

/// Decrypt a `nonce || ciphertext` blob.
///
/// # Errors
///
/// - `CiphertextTruncated`: blob shorter than a nonce plus AEAD tag
/// - `DecryptionFailed`: wrong key or tampered ciphertext
pub fn open(key: &LayerKey, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    // 16-byte Poly1305 tag always follows the payload
    if sealed.len() < NONCE_LEN + 16 {
        return Err(CryptoError::CiphertextTruncated {
            len: sealed.len(),
            min: NONCE_LEN + 16,
        });
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(XNonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
