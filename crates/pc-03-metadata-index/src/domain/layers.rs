//! # Metadata Layers
//!
//! Derived (never authoritative) searchable metadata for one block: a
//! cleartext public layer and an AEAD-sealed private layer.
//!
//! ## Determinism
//!
//! `generate_layers` is a pure function. Ordered collections, bincode
//! encoding, and derived-nonce sealing make its output byte-for-byte
//! reproducible for identical inputs, which is what allows safe
//! re-indexing and idempotent retries.

use crate::domain::errors::IndexError;
use crate::domain::terms::extract_terms;
use crate::domain::visibility::{normalize_term, TermVisibility, VisibilityConfig};
use serde::{Deserialize, Serialize};
use shared_crypto::{blake3_hash, seal_deterministic, open, LayerKey};
use shared_types::{Block, BlockPayload, Hash};
use std::collections::{BTreeMap, BTreeSet};

/// Key-derivation context for per-block layer keys.
const LAYER_KEY_CONTEXT: &str = "permachain layer key v1";

/// Always-readable metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicLayer {
    /// Category tag carried over from the envelope.
    pub category: Option<String>,
    /// Terms partitioned PUBLIC, cleartext.
    pub public_keywords: BTreeSet<String>,
}

/// Contents of the private layer once decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateLayer {
    /// Fingerprint of the signer identity that owns this block.
    pub owner_fingerprint: String,
    /// Technical detail about the payload (kind, size, hash).
    pub technical_details: BTreeMap<String, String>,
    /// Detail a validator would want (sequence, timestamp, signer).
    pub validation_details: BTreeMap<String, String>,
    /// Terms partitioned PRIVATE.
    pub private_keywords: BTreeSet<String>,
}

/// The derived pair: cleartext public layer, sealed private layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataLayers {
    /// Cleartext layer.
    pub public_layer: PublicLayer,
    /// `nonce || ciphertext` of the bincode-encoded [`PrivateLayer`].
    pub private_ciphertext: Vec<u8>,
}

/// Derive the per-block layer key from the master key, the block hash,
/// and the signer identity.
fn layer_key_for(master_key: &LayerKey, block_hash: &Hash, signer: &str) -> LayerKey {
    let mut binding = Vec::with_capacity(32 + signer.len());
    binding.extend_from_slice(block_hash);
    binding.extend_from_slice(signer.as_bytes());
    master_key.derive(LAYER_KEY_CONTEXT, &binding)
}

/// Generate both metadata layers for a block.
///
/// Automatic terms are extracted from the inline payload text (off-chain
/// payloads contribute no automatic terms; exhaustive search scans them at
/// query time) and merged with the envelope's public keywords plus
/// `manual_terms`. The merged set is partitioned by `visibility`; PUBLIC
/// terms land in the cleartext layer, everything else is sealed into the
/// private layer together with technical and validation detail.
///
/// ## Errors
///
/// - `Serialization`: the private layer failed to encode
/// - `Crypto`: sealing failed
pub fn generate_layers(
    block: &Block,
    manual_terms: &[String],
    visibility: &VisibilityConfig,
    master_key: &LayerKey,
) -> Result<MetadataLayers, IndexError> {
    let mut merged: BTreeSet<String> = match &block.payload {
        BlockPayload::Inline(bytes) => extract_terms(&String::from_utf8_lossy(bytes)),
        BlockPayload::External(_) => BTreeSet::new(),
    };
    merged.extend(block.envelope.public_keywords.iter().map(|t| normalize_term(t)));
    merged.extend(manual_terms.iter().map(|t| normalize_term(t)));

    let mut public_keywords = BTreeSet::new();
    let mut private_keywords = BTreeSet::new();
    for term in merged {
        match visibility.visibility_of(&term) {
            TermVisibility::Public => public_keywords.insert(term),
            TermVisibility::Private => private_keywords.insert(term),
        };
    }

    let mut technical_details = BTreeMap::new();
    technical_details.insert(
        "payload_kind".to_string(),
        match &block.payload {
            BlockPayload::Inline(_) => "inline".to_string(),
            BlockPayload::External(_) => "external".to_string(),
        },
    );
    technical_details.insert("payload_size".to_string(), block.payload.len().to_string());
    technical_details.insert(
        "content_hash".to_string(),
        hex::encode(block.content_hash),
    );

    let mut validation_details = BTreeMap::new();
    validation_details.insert("sequence".to_string(), block.sequence().to_string());
    validation_details.insert(
        "timestamp".to_string(),
        block.header.timestamp.to_string(),
    );
    validation_details.insert("signer".to_string(), block.header.signer.clone());

    let private = PrivateLayer {
        owner_fingerprint: hex::encode(blake3_hash(block.header.signer.as_bytes())),
        technical_details,
        validation_details,
        private_keywords,
    };

    let plaintext = bincode::serialize(&private).map_err(|e| IndexError::Serialization {
        message: e.to_string(),
    })?;
    let key = layer_key_for(master_key, &block.content_hash, &block.header.signer);
    let private_ciphertext = seal_deterministic(&key, &block.content_hash, &plaintext)?;

    Ok(MetadataLayers {
        public_layer: PublicLayer {
            category: block.envelope.category.clone(),
            public_keywords,
        },
        private_ciphertext,
    })
}

/// Decrypt a sealed private layer.
///
/// ## Errors
///
/// - `DecryptionFailed`: wrong master key or tampered ciphertext
/// - `Serialization`: ciphertext opened but did not decode
pub fn decrypt_private_layer(
    block_hash: &Hash,
    signer: &str,
    private_ciphertext: &[u8],
    master_key: &LayerKey,
) -> Result<PrivateLayer, IndexError> {
    let key = layer_key_for(master_key, block_hash, signer);
    let plaintext = open(&key, private_ciphertext)?;
    bincode::deserialize(&plaintext).map_err(|e| IndexError::Serialization {
        message: e.to_string(),
    })
}
