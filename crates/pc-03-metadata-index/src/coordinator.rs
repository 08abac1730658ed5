//! # Indexing Coordinator
//!
//! Serializes metadata generation per block hash so that concurrent
//! producers index each block exactly once in effect: one caller
//! generates and stores the layers, every other caller for the same
//! hash observes `AlreadyIndexed`.
//!
//! ## Exclusion Protocol
//!
//! ```text
//! lock = locks.get_or_create(hash)
//! lock.acquire()
//!   ├─ state == Indexed?        → AlreadyIndexed (no work)
//!   ├─ mark InProgress
//!   ├─ generate_layers(block)
//!   │    ├─ ok  → store.put(entry); mark Indexed → NewlyIndexed
//!   │    └─ err → mark Unindexed (retryable); propagate
//! lock.release()
//! ```
//!
//! The state map is authoritative over store contents during a window:
//! a hash is only marked `Indexed` after `put` succeeded, so a crashed
//! or failed attempt leaves the hash retryable.

use crate::domain::errors::IndexError;
use crate::domain::layers::generate_layers;
use crate::domain::visibility::VisibilityConfig;
use crate::ports::outbound::{IndexedEntry, MetadataIndexStore};
use parking_lot::Mutex;
use shared_crypto::LayerKey;
use shared_types::{short_hash, Block, Hash};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of one block hash in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Never indexed, or rolled back after a failed attempt.
    Unindexed,
    /// A holder of the per-hash lock is generating layers right now.
    InProgress,
    /// Layers generated and stored.
    Indexed,
}

/// What a single `index_block` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// This call generated and stored the layers.
    NewlyIndexed,
    /// The hash was already indexed; nothing was generated.
    AlreadyIndexed,
}

/// Tally of one `index_batch` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub newly_indexed: u64,
    pub already_indexed: u64,
    /// Failed blocks with their error text; the batch keeps going past them.
    pub failures: Vec<(Hash, String)>,
}

/// Coordinates exactly-once-in-effect indexing over a [`MetadataIndexStore`].
///
/// The lock and state maps grow with the number of distinct hashes seen
/// and are never evicted; embedders indexing unbounded ledgers should
/// recycle the coordinator between epochs.
pub struct IndexingCoordinator<S: MetadataIndexStore> {
    store: Arc<S>,
    locks: Mutex<HashMap<Hash, Arc<Mutex<()>>>>,
    states: Mutex<HashMap<Hash, IndexState>>,
    visibility: VisibilityConfig,
    /// Fingerprint of `visibility`, stamped onto every entry. Entries
    /// carrying a different fingerprint were produced under another
    /// policy and get regenerated rather than skipped.
    policy_fingerprint: [u8; 32],
    master_key: LayerKey,
}

impl<S: MetadataIndexStore> IndexingCoordinator<S> {
    pub fn new(store: Arc<S>, visibility: VisibilityConfig, master_key: LayerKey) -> Self {
        let policy_fingerprint = visibility.fingerprint();
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
            visibility,
            policy_fingerprint,
            master_key,
        }
    }

    /// Fetch (or create) the exclusion lock for one hash.
    ///
    /// The map itself is only locked long enough to clone the `Arc`, so
    /// contention on hash A never serializes against hash B.
    fn lock_for(&self, hash: &Hash) -> Arc<Mutex<()>> {
        Arc::clone(
            self.locks
                .lock()
                .entry(*hash)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    fn state_of(&self, hash: &Hash) -> IndexState {
        self.states
            .lock()
            .get(hash)
            .copied()
            .unwrap_or(IndexState::Unindexed)
    }

    fn set_state(&self, hash: Hash, state: IndexState) {
        self.states.lock().insert(hash, state);
    }

    /// Index one block, serialized against every other caller for the
    /// same content hash.
    ///
    /// ## Errors
    ///
    /// - `Crypto` / `Serialization`: layer generation failed
    /// - `StoreUnavailable`: the index store rejected the entry
    ///
    /// A failed call rolls the hash back to `Unindexed`; retrying is safe.
    pub fn index_block(
        &self,
        block: &Block,
        manual_terms: &[String],
    ) -> Result<IndexOutcome, IndexError> {
        let hash = block.content_hash;
        let lock = self.lock_for(&hash);
        let _guard = lock.lock();

        if self.state_of(&hash) == IndexState::Indexed {
            debug!("[pc-03] ⏭️  block {} already indexed", short_hash(&hash));
            return Ok(IndexOutcome::AlreadyIndexed);
        }

        // A fresh coordinator trusts entries a predecessor stored under
        // the same policy; a fingerprint mismatch forces regeneration.
        if let Some(entry) = self.store.get(&hash)? {
            if entry.policy_fingerprint == self.policy_fingerprint {
                self.set_state(hash, IndexState::Indexed);
                debug!(
                    "[pc-03] ⏭️  block {} already indexed under this policy",
                    short_hash(&hash)
                );
                return Ok(IndexOutcome::AlreadyIndexed);
            }
        }

        self.set_state(hash, IndexState::InProgress);
        match self.generate_and_store(block, manual_terms) {
            Ok(()) => {
                self.set_state(hash, IndexState::Indexed);
                info!(
                    "[pc-03] 🗂️  indexed block #{} ({})",
                    block.sequence(),
                    short_hash(&hash)
                );
                Ok(IndexOutcome::NewlyIndexed)
            }
            Err(e) => {
                self.set_state(hash, IndexState::Unindexed);
                warn!(
                    "[pc-03] ⚠️  indexing failed for block #{} ({}): {}",
                    block.sequence(),
                    short_hash(&hash),
                    e
                );
                Err(e)
            }
        }
    }

    fn generate_and_store(
        &self,
        block: &Block,
        manual_terms: &[String],
    ) -> Result<(), IndexError> {
        let layers = generate_layers(block, manual_terms, &self.visibility, &self.master_key)?;
        self.store.put(IndexedEntry {
            block_hash: block.content_hash,
            sequence: block.sequence(),
            signer: block.header.signer.clone(),
            policy_fingerprint: self.policy_fingerprint,
            timestamp: block.header.timestamp,
            category: layers.public_layer.category,
            public_terms: layers.public_layer.public_keywords,
            private_ciphertext: layers.private_ciphertext,
            annotations: block.envelope.annotations.clone(),
        })
    }

    /// Index a batch of blocks. A failing block is recorded in the
    /// outcome and the batch continues with the next one.
    pub fn index_batch(&self, blocks: &[Block]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for block in blocks {
            match self.index_block(block, &[]) {
                Ok(IndexOutcome::NewlyIndexed) => outcome.newly_indexed += 1,
                Ok(IndexOutcome::AlreadyIndexed) => outcome.already_indexed += 1,
                Err(e) => outcome.failures.push((block.content_hash, e.to_string())),
            }
        }
        info!(
            "[pc-03] 🗂️  batch done: {} new, {} existing, {} failed",
            outcome.newly_indexed,
            outcome.already_indexed,
            outcome.failures.len()
        );
        outcome
    }

    /// Regenerate layers for an already-indexed block, e.g. after a
    /// visibility change. Runs under the same per-hash exclusion.
    pub fn reindex_block(
        &self,
        block: &Block,
        manual_terms: &[String],
    ) -> Result<(), IndexError> {
        let hash = block.content_hash;
        let lock = self.lock_for(&hash);
        let _guard = lock.lock();

        self.set_state(hash, IndexState::InProgress);
        match self.generate_and_store(block, manual_terms) {
            Ok(()) => {
                self.set_state(hash, IndexState::Indexed);
                info!(
                    "[pc-03] 🔄 reindexed block #{} ({})",
                    block.sequence(),
                    short_hash(&hash)
                );
                Ok(())
            }
            Err(e) => {
                // Previous entry (if any) is still in the store; keep the
                // hash retryable rather than claiming Indexed.
                self.set_state(hash, IndexState::Unindexed);
                Err(e)
            }
        }
    }

    /// Current lifecycle state for a hash.
    pub fn index_state(&self, hash: &Hash) -> IndexState {
        self.state_of(hash)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Drop all coordinator state. Store contents are untouched.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn reset(&self) {
        self.locks.lock().clear();
        self.states.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::InMemoryIndexStore;
    use shared_crypto::blake3_hash;
    use shared_types::{BlockHeader, BlockPayload, MetadataEnvelope, Signature};

    fn sample_block(sequence: u64, payload: &[u8]) -> Block {
        let header = BlockHeader {
            sequence,
            previous_hash: [0; 32],
            timestamp: 1_700_000_000 + sequence,
            signer: "clerk-1".to_string(),
        };
        let payload = BlockPayload::Inline(payload.to_vec());
        let content_hash = blake3_hash(&Block::content_preimage(&header, &payload));
        Block {
            header,
            payload,
            content_hash,
            signature: Signature::from_bytes([0; 64]),
            envelope: MetadataEnvelope::default(),
        }
    }

    fn coordinator() -> IndexingCoordinator<InMemoryIndexStore> {
        IndexingCoordinator::new(
            Arc::new(InMemoryIndexStore::new()),
            VisibilityConfig::default(),
            LayerKey::from_bytes([0x07; 32]),
        )
    }

    #[test]
    fn test_first_index_is_newly_indexed() {
        let coord = coordinator();
        let block = sample_block(0, b"invoice 2024");

        assert_eq!(
            coord.index_block(&block, &[]).unwrap(),
            IndexOutcome::NewlyIndexed
        );
        assert_eq!(coord.index_state(&block.content_hash), IndexState::Indexed);
        assert_eq!(coord.store().len().unwrap(), 1);
    }

    #[test]
    fn test_second_index_is_a_no_op() {
        let coord = coordinator();
        let block = sample_block(0, b"invoice 2024");

        coord.index_block(&block, &[]).unwrap();
        assert_eq!(
            coord.index_block(&block, &[]).unwrap(),
            IndexOutcome::AlreadyIndexed
        );
        assert_eq!(coord.store().len().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_same_hash_indexes_once() {
        let coord = Arc::new(coordinator());
        let block = sample_block(0, b"invoice 2024 ACME-99");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let coord = Arc::clone(&coord);
            let block = block.clone();
            handles.push(std::thread::spawn(move || {
                coord.index_block(&block, &[]).unwrap()
            }));
        }

        let mut newly = 0;
        let mut existing = 0;
        for handle in handles {
            match handle.join().unwrap() {
                IndexOutcome::NewlyIndexed => newly += 1,
                IndexOutcome::AlreadyIndexed => existing += 1,
            }
        }
        assert_eq!(newly, 1);
        assert_eq!(existing, 15);
        assert_eq!(coord.store().len().unwrap(), 1);
    }

    #[test]
    fn test_batch_counts_new_and_existing() {
        let coord = coordinator();
        let a = sample_block(0, b"invoice 2024");
        let b = sample_block(1, b"receipt 2025");

        coord.index_block(&a, &[]).unwrap();
        let outcome = coord.index_batch(&[a, b]);

        assert_eq!(outcome.newly_indexed, 1);
        assert_eq!(outcome.already_indexed, 1);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_failed_attempt_stays_retryable() {
        struct FailingStore {
            inner: InMemoryIndexStore,
            fail: std::sync::atomic::AtomicBool,
        }
        impl MetadataIndexStore for FailingStore {
            fn get(&self, h: &Hash) -> Result<Option<IndexedEntry>, IndexError> {
                self.inner.get(h)
            }
            fn put(&self, entry: IndexedEntry) -> Result<(), IndexError> {
                if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                    return Err(IndexError::StoreUnavailable {
                        message: "injected".to_string(),
                    });
                }
                self.inner.put(entry)
            }
            fn remove(&self, h: &Hash) -> Result<(), IndexError> {
                self.inner.remove(h)
            }
            fn scan(
                &self,
                visitor: &mut dyn FnMut(&IndexedEntry) -> bool,
            ) -> Result<(), IndexError> {
                self.inner.scan(visitor)
            }
            fn len(&self) -> Result<usize, IndexError> {
                self.inner.len()
            }
        }

        let store = Arc::new(FailingStore {
            inner: InMemoryIndexStore::new(),
            fail: std::sync::atomic::AtomicBool::new(true),
        });
        let coord = IndexingCoordinator::new(
            Arc::clone(&store),
            VisibilityConfig::default(),
            LayerKey::from_bytes([0x07; 32]),
        );
        let block = sample_block(0, b"invoice 2024");

        assert!(coord.index_block(&block, &[]).is_err());
        assert_eq!(
            coord.index_state(&block.content_hash),
            IndexState::Unindexed
        );

        store.fail.store(false, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(
            coord.index_block(&block, &[]).unwrap(),
            IndexOutcome::NewlyIndexed
        );
    }

    #[test]
    fn test_reindex_replaces_entry() {
        let mut visibility = VisibilityConfig::default();
        visibility.set("2024", crate::domain::visibility::TermVisibility::Public);
        let store = Arc::new(InMemoryIndexStore::new());
        let coord = IndexingCoordinator::new(
            Arc::clone(&store),
            visibility,
            LayerKey::from_bytes([0x07; 32]),
        );
        let block = sample_block(0, b"invoice 2024");

        coord.index_block(&block, &[]).unwrap();
        coord
            .reindex_block(&block, &["follow-up1".to_string()])
            .unwrap();

        let entry = store.get(&block.content_hash).unwrap().unwrap();
        assert!(entry.public_terms.contains("2024"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_fresh_coordinator_trusts_same_policy_entries() {
        let store = Arc::new(InMemoryIndexStore::new());
        let block = sample_block(0, b"invoice 2024");

        let first = IndexingCoordinator::new(
            Arc::clone(&store),
            VisibilityConfig::default(),
            LayerKey::from_bytes([0x07; 32]),
        );
        first.index_block(&block, &[]).unwrap();

        // Same store, same policy, fresh in-memory state.
        let second = IndexingCoordinator::new(
            Arc::clone(&store),
            VisibilityConfig::default(),
            LayerKey::from_bytes([0x07; 32]),
        );
        assert_eq!(
            second.index_block(&block, &[]).unwrap(),
            IndexOutcome::AlreadyIndexed
        );
        assert_eq!(second.index_state(&block.content_hash), IndexState::Indexed);
    }

    #[test]
    fn test_policy_change_forces_regeneration() {
        let store = Arc::new(InMemoryIndexStore::new());
        let block = sample_block(0, b"invoice 2024");

        let closed = IndexingCoordinator::new(
            Arc::clone(&store),
            VisibilityConfig::default(),
            LayerKey::from_bytes([0x07; 32]),
        );
        closed.index_block(&block, &[]).unwrap();
        assert!(store
            .get(&block.content_hash)
            .unwrap()
            .unwrap()
            .public_terms
            .is_empty());

        let mut visibility = VisibilityConfig::default();
        visibility.set("2024", crate::domain::visibility::TermVisibility::Public);
        let open = IndexingCoordinator::new(
            Arc::clone(&store),
            visibility,
            LayerKey::from_bytes([0x07; 32]),
        );
        assert_eq!(
            open.index_block(&block, &[]).unwrap(),
            IndexOutcome::NewlyIndexed
        );
        let entry = store.get(&block.content_hash).unwrap().unwrap();
        assert!(entry.public_terms.contains("2024"));
        assert_eq!(store.len().unwrap(), 1);
    }
}
