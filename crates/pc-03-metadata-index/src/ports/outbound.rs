//! # Outbound Ports (Metadata Index)
//!
//! Storage abstraction for derived index entries plus the in-memory
//! reference adapter used by tests and embedded deployments.

use crate::domain::errors::IndexError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, Timestamp};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One indexed block, keyed by its content hash.
///
/// The entry mirrors the metadata layers: public fields are cleartext,
/// the private layer stays as the sealed ciphertext it was generated as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEntry {
    /// Content hash of the indexed block.
    pub block_hash: Hash,
    /// Sequence number of the block in the ledger.
    pub sequence: u64,
    /// Signer identity, needed to re-derive the layer key.
    pub signer: String,
    /// Fingerprint of the visibility policy the layers were generated
    /// under. A mismatch marks the entry as needing a re-index.
    pub policy_fingerprint: [u8; 32],
    /// Block timestamp, for time grouping in search results.
    pub timestamp: Timestamp,
    /// Category from the public layer.
    pub category: Option<String>,
    /// Cleartext PUBLIC terms.
    pub public_terms: BTreeSet<String>,
    /// Sealed private layer (`nonce || ciphertext`).
    pub private_ciphertext: Vec<u8>,
    /// Opaque annotations copied from the envelope.
    pub annotations: BTreeMap<String, Vec<u8>>,
}

/// Persistence port for index entries.
///
/// Implementations must make `put` atomic per entry; the coordinator
/// relies on a stored entry being either fully present or absent.
pub trait MetadataIndexStore: Send + Sync {
    /// Fetch the entry for a block hash, if indexed.
    fn get(&self, block_hash: &Hash) -> Result<Option<IndexedEntry>, IndexError>;

    /// Insert or replace the entry for `entry.block_hash`.
    fn put(&self, entry: IndexedEntry) -> Result<(), IndexError>;

    /// Remove the entry for a block hash. Removing an absent hash is a no-op.
    fn remove(&self, block_hash: &Hash) -> Result<(), IndexError>;

    /// Visit entries in ascending sequence order until the visitor
    /// returns `false` or entries run out.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&IndexedEntry) -> bool,
    ) -> Result<(), IndexError>;

    /// Number of indexed entries.
    fn len(&self) -> Result<usize, IndexError>;

    fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.len()? == 0)
    }
}

/// In-memory reference adapter backed by `parking_lot`.
#[derive(Debug, Default)]
pub struct InMemoryIndexStore {
    by_hash: RwLock<HashMap<Hash, IndexedEntry>>,
    by_sequence: RwLock<BTreeMap<u64, Hash>>,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataIndexStore for InMemoryIndexStore {
    fn get(&self, block_hash: &Hash) -> Result<Option<IndexedEntry>, IndexError> {
        Ok(self.by_hash.read().get(block_hash).cloned())
    }

    fn put(&self, entry: IndexedEntry) -> Result<(), IndexError> {
        let mut by_hash = self.by_hash.write();
        let mut by_sequence = self.by_sequence.write();
        by_sequence.insert(entry.sequence, entry.block_hash);
        by_hash.insert(entry.block_hash, entry);
        Ok(())
    }

    fn remove(&self, block_hash: &Hash) -> Result<(), IndexError> {
        let mut by_hash = self.by_hash.write();
        if let Some(entry) = by_hash.remove(block_hash) {
            self.by_sequence.write().remove(&entry.sequence);
        }
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&IndexedEntry) -> bool,
    ) -> Result<(), IndexError> {
        let by_hash = self.by_hash.read();
        let by_sequence = self.by_sequence.read();
        for hash in by_sequence.values() {
            if let Some(entry) = by_hash.get(hash) {
                if !visitor(entry) {
                    break;
                }
            }
        }
        Ok(())
    }

    fn len(&self) -> Result<usize, IndexError> {
        Ok(self.by_hash.read().len())
    }
}
