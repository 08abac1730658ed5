//! # Metadata Envelope
//!
//! The mutable annotation layer attached to every block. The envelope
//! evolves over a block's life (search enrichment, categorization,
//! recipient re-keying) while the hash-critical fields stay frozen.
//!
//! Custom annotations are a typed key-value map with enforced size, count,
//! and key-length limits at the boundary rather than a free-form blob, so
//! the envelope cannot grow without bound or smuggle injection-style keys.

use crate::errors::EnvelopeError;
use crate::ContentReference;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Mutable metadata attached to a committed block.
///
/// Uses ordered collections throughout so envelope serialization is
/// deterministic, which metadata-layer regeneration relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEnvelope {
    /// Category tag, exact-matchable in search.
    pub category: Option<String>,
    /// Cleartext keywords, searchable without credentials.
    pub public_keywords: BTreeSet<String>,
    /// Free-form annotations; values are AEAD-encrypted by callers that
    /// need confidentiality, stored opaquely here.
    pub annotations: BTreeMap<String, Vec<u8>>,
    /// Descriptor of the off-chain payload, when one exists.
    pub external_ref: Option<ContentReference>,
}

impl MetadataEnvelope {
    /// Validate the envelope against boundary limits.
    ///
    /// ## Errors
    ///
    /// - `TooManyAnnotations`: annotation count above `limits.max_annotations`
    /// - `KeyTooLong`: an annotation key longer than `limits.max_key_len`
    /// - `ValueTooLarge`: an annotation value above `limits.max_value_len`
    /// - `TooManyKeywords`: public keyword count above `limits.max_keywords`
    pub fn validate(&self, limits: &EnvelopeLimits) -> Result<(), EnvelopeError> {
        if self.annotations.len() > limits.max_annotations {
            return Err(EnvelopeError::TooManyAnnotations {
                count: self.annotations.len(),
                max: limits.max_annotations,
            });
        }
        for (key, value) in &self.annotations {
            if key.len() > limits.max_key_len {
                return Err(EnvelopeError::KeyTooLong {
                    len: key.len(),
                    max: limits.max_key_len,
                });
            }
            if value.len() > limits.max_value_len {
                return Err(EnvelopeError::ValueTooLarge {
                    key: key.clone(),
                    len: value.len(),
                    max: limits.max_value_len,
                });
            }
        }
        if self.public_keywords.len() > limits.max_keywords {
            return Err(EnvelopeError::TooManyKeywords {
                count: self.public_keywords.len(),
                max: limits.max_keywords,
            });
        }
        Ok(())
    }
}

/// Boundary limits for envelope mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeLimits {
    /// Maximum number of annotation entries.
    pub max_annotations: usize,
    /// Maximum annotation key length in bytes.
    pub max_key_len: usize,
    /// Maximum annotation value size in bytes.
    pub max_value_len: usize,
    /// Maximum number of public keywords.
    pub max_keywords: usize,
}

impl Default for EnvelopeLimits {
    fn default() -> Self {
        Self {
            max_annotations: 64,
            max_key_len: 128,
            max_value_len: 16 * 1024,
            max_keywords: 256,
        }
    }
}
