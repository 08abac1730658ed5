//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the Ledger Store requires the host application to provide:
//! the persistence backend, the sequence counter store, the authorization
//! registry, the signing provider, the off-chain blob store, and a time
//! source.
//!
//! In-memory reference adapters for each port live below; embedders swap
//! in durable implementations without touching the service.

use crate::domain::errors::{BackendError, BlobError, SigningError};
use crate::domain::records::StoredRecord;
use parking_lot::{Mutex, RwLock};
use shared_crypto::{blake3_hash, Ed25519KeyPair};
use shared_types::{
    AuthorizedSigner, ContentReference, Hash, Signature, SignerId, Timestamp,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

/// Durable storage for the block sequence counter.
///
/// `reserve_next` must be a single atomic unit: no two concurrent callers
/// may observe the same value, and the counter only advances (except via
/// `reset_to`, which truncation calls under the exclusive chain lock).
pub trait SequenceStore: Send + Sync {
    /// Atomically reserve and return the next block number.
    fn reserve_next(&self) -> Result<u64, BackendError>;

    /// Rewind the counter so the next reservation returns `next`.
    fn reset_to(&self, next: u64) -> Result<(), BackendError>;
}

/// Durable, sequence-ordered storage for block records.
///
/// Writes must be atomic per record. Range reads are ordered by sequence
/// number and bounded by the caller's limit; the offset type is 64-bit so
/// multi-billion-record ledgers paginate without overflow.
pub trait LedgerBackend: Send + Sync {
    /// Atomically insert or replace one record.
    fn put_record(&mut self, record: StoredRecord) -> Result<(), BackendError>;

    /// Fetch by sequence number.
    fn get_by_number(&self, sequence: u64) -> Result<Option<StoredRecord>, BackendError>;

    /// Fetch by block content hash.
    fn get_by_hash(&self, hash: &Hash) -> Result<Option<StoredRecord>, BackendError>;

    /// The record with the highest sequence number.
    fn tail(&self) -> Result<Option<StoredRecord>, BackendError>;

    /// Up to `limit` records with sequence strictly greater than `after`,
    /// lowest first. `None` starts from the beginning.
    fn range_after(
        &self,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<StoredRecord>, BackendError>;

    /// Up to `limit` records starting `offset` records into the
    /// sequence-ordered ledger.
    fn page(&self, offset: u64, limit: usize) -> Result<Vec<StoredRecord>, BackendError>;

    /// Atomically remove and return up to `limit` records with sequence
    /// strictly greater than `after`, lowest first.
    fn take_range_after(
        &mut self,
        after: u64,
        limit: usize,
    ) -> Result<Vec<StoredRecord>, BackendError>;

    /// Total number of stored records.
    fn count(&self) -> Result<u64, BackendError>;
}

/// Tracks which signer identities are authorized, and when.
pub trait AuthorizationRegistry: Send + Sync {
    /// Was `identity` authorized (activated, not yet revoked) at `at`?
    fn is_authorized(&self, identity: &str, at: Timestamp) -> bool;

    /// The currently active public key for `identity`, if any.
    fn current_key_for(&self, identity: &str) -> Option<[u8; 32]>;

    /// The public key bound to `identity` at `at`, for retroactive
    /// signature verification of historical blocks. The binding follows
    /// activation time alone: revoking a signer ends their authorization,
    /// not the record of which key they signed with.
    fn key_for_at(&self, identity: &str, at: Timestamp) -> Option<[u8; 32]>;
}

/// Produces signatures over content hashes on behalf of signer identities.
///
/// The reference adapter keeps seeds in memory; an HSM-backed provider
/// implements the same trait.
pub trait SigningProvider: Send + Sync {
    /// Sign `digest` with the key material for `identity`.
    fn sign(&self, identity: &str, digest: &Hash) -> Result<Signature, SigningError>;
}

/// Off-chain storage for payloads above the inline threshold.
pub trait BlobStore: Send + Sync {
    /// Store `bytes`, returning an opaque reference.
    fn store(&self, bytes: &[u8]) -> Result<ContentReference, BlobError>;

    /// Retrieve the bytes behind a reference.
    fn retrieve(&self, reference: &ContentReference) -> Result<Vec<u8>, BlobError>;

    /// Check that the stored bytes still match the reference digest.
    fn verify_integrity(&self, reference: &ContentReference) -> Result<bool, BlobError>;

    /// Release a reference during truncation cleanup.
    fn release(&self, reference: &ContentReference) -> Result<(), BlobError>;
}

/// Abstract time source (for testability).
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// REFERENCE ADAPTERS
// Durable implementations live with the embedding application; these
// in-memory versions back tests and light embedders.
// =============================================================================

/// Atomic in-memory sequence counter.
#[derive(Default)]
pub struct InMemorySequence {
    next: AtomicU64,
}

impl InMemorySequence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceStore for InMemorySequence {
    fn reserve_next(&self) -> Result<u64, BackendError> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }

    fn reset_to(&self, next: u64) -> Result<(), BackendError> {
        self.next.store(next, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory backend: records ordered by sequence, hash index on the side.
#[derive(Default)]
pub struct InMemoryBackend {
    records: BTreeMap<u64, StoredRecord>,
    by_hash: HashMap<Hash, u64>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerBackend for InMemoryBackend {
    fn put_record(&mut self, record: StoredRecord) -> Result<(), BackendError> {
        let sequence = record.block.sequence();
        self.by_hash.insert(record.block.content_hash, sequence);
        self.records.insert(sequence, record);
        Ok(())
    }

    fn get_by_number(&self, sequence: u64) -> Result<Option<StoredRecord>, BackendError> {
        Ok(self.records.get(&sequence).cloned())
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Option<StoredRecord>, BackendError> {
        Ok(self
            .by_hash
            .get(hash)
            .and_then(|sequence| self.records.get(sequence))
            .cloned())
    }

    fn tail(&self) -> Result<Option<StoredRecord>, BackendError> {
        Ok(self.records.values().next_back().cloned())
    }

    fn range_after(
        &self,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<StoredRecord>, BackendError> {
        let range = match after {
            Some(after) => self.records.range(after.saturating_add(1)..),
            None => self.records.range(..),
        };
        Ok(range.take(limit).map(|(_, record)| record.clone()).collect())
    }

    fn page(&self, offset: u64, limit: usize) -> Result<Vec<StoredRecord>, BackendError> {
        if offset > usize::MAX as u64 {
            return Ok(Vec::new());
        }
        Ok(self
            .records
            .values()
            .skip(offset as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    fn take_range_after(
        &mut self,
        after: u64,
        limit: usize,
    ) -> Result<Vec<StoredRecord>, BackendError> {
        let numbers: Vec<u64> = self
            .records
            .range(after.saturating_add(1)..)
            .take(limit)
            .map(|(sequence, _)| *sequence)
            .collect();

        let mut removed = Vec::with_capacity(numbers.len());
        for sequence in numbers {
            if let Some(record) = self.records.remove(&sequence) {
                self.by_hash.remove(&record.block.content_hash);
                removed.push(record);
            }
        }
        Ok(removed)
    }

    fn count(&self) -> Result<u64, BackendError> {
        Ok(self.records.len() as u64)
    }
}

/// In-memory authorization registry with full key history.
#[derive(Default)]
pub struct InMemoryRegistry {
    history: RwLock<HashMap<SignerId, Vec<AuthorizedSigner>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new active binding for `identity`, revoking none.
    pub fn authorize(&self, identity: SignerId, public_key: [u8; 32], activated_at: Timestamp) {
        let record = AuthorizedSigner {
            identity: identity.clone(),
            public_key,
            activated_at,
            revoked_at: None,
        };
        self.history.write().entry(identity).or_default().push(record);
    }

    /// Revoke every active binding for `identity` as of `at`.
    pub fn revoke(&self, identity: &str, at: Timestamp) {
        if let Some(records) = self.history.write().get_mut(identity) {
            for record in records.iter_mut().filter(|r| r.revoked_at.is_none()) {
                record.revoked_at = Some(at);
            }
        }
    }

    /// Full binding history for `identity`.
    pub fn history_for(&self, identity: &str) -> Vec<AuthorizedSigner> {
        self.history
            .read()
            .get(identity)
            .cloned()
            .unwrap_or_default()
    }

    /// Privileged hard-delete of an identity's key history. Blocks signed
    /// by the identity are untouched; only the bindings disappear.
    pub fn purge_history(&self, identity: &str) -> usize {
        let removed = self
            .history
            .write()
            .remove(identity)
            .map(|records| records.len())
            .unwrap_or(0);
        if removed > 0 {
            tracing::warn!(
                "[pc-01] 🗑 Purged {} key binding(s) for signer '{}'",
                removed,
                identity
            );
        }
        removed
    }
}

impl AuthorizationRegistry for InMemoryRegistry {
    fn is_authorized(&self, identity: &str, at: Timestamp) -> bool {
        self.history
            .read()
            .get(identity)
            .map(|records| records.iter().any(|r| r.was_authorized_at(at)))
            .unwrap_or(false)
    }

    fn current_key_for(&self, identity: &str) -> Option<[u8; 32]> {
        self.history.read().get(identity).and_then(|records| {
            records
                .iter()
                .rev()
                .find(|r| r.is_active())
                .map(|r| r.public_key)
        })
    }

    fn key_for_at(&self, identity: &str, at: Timestamp) -> Option<[u8; 32]> {
        // Latest binding activated on or before `at`. Revocation is
        // deliberately ignored here; it affects authorization, not which
        // key produced a historical signature.
        self.history.read().get(identity).and_then(|records| {
            records
                .iter()
                .rev()
                .find(|r| r.activated_at <= at)
                .map(|r| r.public_key)
        })
    }
}

/// In-memory Ed25519 keyring.
#[derive(Default)]
pub struct InMemoryKeyring {
    seeds: RwLock<HashMap<SignerId, [u8; 32]>>,
}

impl InMemoryKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a keypair for `identity`, returning the public key bytes.
    pub fn generate(&self, identity: SignerId) -> [u8; 32] {
        let mut seed = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut seed);
        self.install(identity, seed)
    }

    /// Install an explicit seed for `identity`, returning the public key.
    pub fn install(&self, identity: SignerId, seed: [u8; 32]) -> [u8; 32] {
        let keypair = Ed25519KeyPair::from_seed(seed);
        let public = *keypair.public_key().as_bytes();
        self.seeds.write().insert(identity, seed);
        public
    }

    /// Drop the key material for `identity`.
    pub fn remove(&self, identity: &str) {
        self.seeds.write().remove(identity);
    }
}

impl SigningProvider for InMemoryKeyring {
    fn sign(&self, identity: &str, digest: &Hash) -> Result<Signature, SigningError> {
        let seed = self
            .seeds
            .read()
            .get(identity)
            .copied()
            .ok_or_else(|| SigningError::NoKeyMaterial {
                identity: identity.to_string(),
            })?;
        let keypair = Ed25519KeyPair::from_seed(seed);
        Ok(Signature::from_bytes(*keypair.sign(digest).as_bytes()))
    }
}

/// In-memory blob store keyed by content digest.
#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live blobs (released references are gone).
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// True when no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn store(&self, bytes: &[u8]) -> Result<ContentReference, BlobError> {
        let digest = blake3_hash(bytes);
        let token = hex::encode(digest);
        self.blobs.lock().insert(token.clone(), bytes.to_vec());
        Ok(ContentReference {
            token,
            size: bytes.len() as u64,
            digest,
        })
    }

    fn retrieve(&self, reference: &ContentReference) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .lock()
            .get(&reference.token)
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                token: reference.token.clone(),
            })
    }

    fn verify_integrity(&self, reference: &ContentReference) -> Result<bool, BlobError> {
        let bytes = self.retrieve(reference)?;
        Ok(blake3_hash(&bytes) == reference.digest)
    }

    fn release(&self, reference: &ContentReference) -> Result<(), BlobError> {
        self.blobs.lock().remove(&reference.token);
        Ok(())
    }
}

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Controllable time source for tests.
pub struct FixedTimeSource {
    now: AtomicU64,
}

impl FixedTimeSource {
    /// Create a source frozen at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Move the clock.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
