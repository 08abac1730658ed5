//! # Term Visibility
//!
//! Per-term policy deciding whether a search term is stored in cleartext
//! (PUBLIC, searchable without credentials) or only inside the encrypted
//! private layer (PRIVATE). Unmapped terms fall back to a configurable
//! default, PRIVATE unless the embedder opts out.
//!
//! Every term is normalized (lower-cased, trimmed) before lookup, both
//! when the map is built and when it is queried.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Visibility class of a single term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TermVisibility {
    /// Stored in cleartext; searchable without credentials.
    Public,
    /// Stored only inside the encrypted private layer.
    #[default]
    Private,
}

/// Normalize a term for map lookup and index storage.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Caller-supplied visibility policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    map: HashMap<String, TermVisibility>,
    default: TermVisibility,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self::new(TermVisibility::Private)
    }
}

impl VisibilityConfig {
    /// Empty map with the given default for unmapped terms.
    pub fn new(default: TermVisibility) -> Self {
        Self {
            map: HashMap::new(),
            default,
        }
    }

    /// Set the visibility of one term (normalized on insert).
    pub fn set(&mut self, term: &str, visibility: TermVisibility) -> &mut Self {
        self.map.insert(normalize_term(term), visibility);
        self
    }

    /// Look up the visibility of a term (normalized on lookup).
    pub fn visibility_of(&self, term: &str) -> TermVisibility {
        self.map
            .get(&normalize_term(term))
            .copied()
            .unwrap_or(self.default)
    }

    /// The default applied to unmapped terms.
    pub fn default_visibility(&self) -> TermVisibility {
        self.default
    }

    /// Stable fingerprint of this configuration, used to detect that an
    /// indexed entry was produced under a different policy.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut entries: Vec<(&String, &TermVisibility)> = self.map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut hasher = shared_crypto::Blake3Hasher::new();
        hasher.update(match self.default {
            TermVisibility::Public => b"default:public".as_slice(),
            TermVisibility::Private => b"default:private".as_slice(),
        });
        for (term, visibility) in entries {
            hasher.update(term.as_bytes());
            hasher.update(match visibility {
                TermVisibility::Public => b"=public;".as_slice(),
                TermVisibility::Private => b"=private;".as_slice(),
            });
        }
        hasher.finalize()
    }
}
