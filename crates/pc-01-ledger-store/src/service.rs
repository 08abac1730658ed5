//! # Ledger Service
//!
//! Application service wiring the domain logic to the outbound ports and
//! implementing [`LedgerApi`].
//!
//! Concurrency model: the chain state (backend) sits behind one
//! [`ChainLock`]. Append, truncation, and envelope updates take the
//! exclusive write mode; point lookups, pagination, and batch traversal
//! use the optimistic read path. The sequence number is reserved while
//! holding the write lock, so sequence order always equals commit order;
//! a failure between reservation and persist leaves a gap, never a
//! duplicate.

use crate::domain::chain_lock::ChainLock;
use crate::domain::config::LedgerConfig;
use crate::domain::errors::LedgerError;
use crate::domain::records::StoredRecord;
use crate::domain::sequencer::BlockSequencer;
use crate::ports::inbound::LedgerApi;
use crate::ports::outbound::{
    AuthorizationRegistry, BlobStore, InMemoryBackend, InMemoryBlobStore, InMemoryKeyring,
    InMemoryRegistry, InMemorySequence, LedgerBackend, SequenceStore, SigningProvider,
    SystemTimeSource, TimeSource,
};
use shared_crypto::blake3_hash;
use shared_types::{
    short_hash, Block, BlockHeader, BlockPayload, ContentReference, Hash, MetadataEnvelope,
    SignerId, Timestamp, GENESIS_PARENT_HASH,
};
use std::sync::Arc;

/// The Ledger Store application service.
pub struct LedgerService<B, SQ, AR, SP, OB, TS>
where
    B: LedgerBackend,
    SQ: SequenceStore,
    AR: AuthorizationRegistry,
    SP: SigningProvider,
    OB: BlobStore,
    TS: TimeSource,
{
    chain: ChainLock<B>,
    sequencer: BlockSequencer<SQ>,
    registry: Arc<AR>,
    signer: Arc<SP>,
    blobs: Arc<OB>,
    time: TS,
    config: LedgerConfig,
}

/// Fully in-memory service for tests and light embedders.
pub type InMemoryLedger = LedgerService<
    InMemoryBackend,
    InMemorySequence,
    InMemoryRegistry,
    InMemoryKeyring,
    InMemoryBlobStore,
    SystemTimeSource,
>;

impl LedgerService<
    InMemoryBackend,
    InMemorySequence,
    InMemoryRegistry,
    InMemoryKeyring,
    InMemoryBlobStore,
    SystemTimeSource,
> {
    /// Create a service backed entirely by in-memory adapters.
    pub fn new_in_memory(config: LedgerConfig) -> Self {
        Self::new(
            InMemoryBackend::new(),
            Arc::new(InMemorySequence::new()),
            Arc::new(InMemoryRegistry::new()),
            Arc::new(InMemoryKeyring::new()),
            Arc::new(InMemoryBlobStore::new()),
            SystemTimeSource,
            config,
        )
    }
}

impl<B, SQ, AR, SP, OB, TS> LedgerService<B, SQ, AR, SP, OB, TS>
where
    B: LedgerBackend,
    SQ: SequenceStore,
    AR: AuthorizationRegistry,
    SP: SigningProvider,
    OB: BlobStore,
    TS: TimeSource,
{
    /// Wire a service from explicit adapters.
    pub fn new(
        backend: B,
        sequence: Arc<SQ>,
        registry: Arc<AR>,
        signer: Arc<SP>,
        blobs: Arc<OB>,
        time: TS,
        config: LedgerConfig,
    ) -> Self {
        Self {
            chain: ChainLock::new(backend),
            sequencer: BlockSequencer::new(sequence),
            registry,
            signer,
            blobs,
            time,
            config,
        }
    }

    /// The registry this service consults at append time.
    pub fn registry(&self) -> &Arc<AR> {
        &self.registry
    }

    /// The signing provider behind this service.
    pub fn signing_provider(&self) -> &Arc<SP> {
        &self.signer
    }

    /// The off-chain blob store behind this service.
    pub fn blob_store(&self) -> &Arc<OB> {
        &self.blobs
    }

    /// Active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Total committed blocks.
    pub fn len(&self) -> Result<u64, LedgerError> {
        Ok(self.chain.optimistic_read(|backend| backend.count())?)
    }

    /// True when no block has been committed.
    pub fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    /// Decide inline vs off-chain placement for an incoming payload.
    fn place_payload(
        &self,
        payload: Vec<u8>,
    ) -> Result<(BlockPayload, Option<ContentReference>), LedgerError> {
        if payload.len() as u64 > self.config.inline_payload_threshold {
            let reference = self.blobs.store(&payload)?;
            tracing::debug!(
                "[pc-01] Payload of {} bytes moved off-chain as '{}'",
                payload.len(),
                reference.token
            );
            Ok((BlockPayload::External(reference.clone()), Some(reference)))
        } else {
            Ok((BlockPayload::Inline(payload), None))
        }
    }

    /// Sequence, hash, sign, and persist one placed payload.
    fn commit_block(
        &self,
        payload: BlockPayload,
        external_ref: Option<ContentReference>,
        signer: SignerId,
        now: Timestamp,
    ) -> Result<Block, LedgerError> {
        let mut chain = self.chain.write();

        let previous_hash = match chain.tail()? {
            Some(record) => record.verify()?.content_hash,
            None => GENESIS_PARENT_HASH,
        };

        // Reserved under the write lock: sequence order equals commit
        // order, and an abort from here on leaves a gap, never a duplicate.
        let sequence = self.sequencer.next()?;

        let header = BlockHeader {
            sequence,
            previous_hash,
            timestamp: now,
            signer: signer.clone(),
        };
        let content_hash = blake3_hash(&Block::content_preimage(&header, &payload));
        let signature =
            self.signer
                .sign(&signer, &content_hash)
                .map_err(|e| LedgerError::SigningFailed {
                    identity: signer.clone(),
                    message: e.to_string(),
                })?;

        let block = Block {
            header,
            payload,
            content_hash,
            signature,
            envelope: MetadataEnvelope {
                external_ref,
                ..MetadataEnvelope::default()
            },
        };

        let record = StoredRecord::seal(block.clone(), now)?;
        chain.put_record(record)?;

        tracing::info!(
            "[pc-01] 📦 Block #{} appended by '{}' (hash {})",
            sequence,
            block.header.signer,
            short_hash(&block.content_hash)
        );
        Ok(block)
    }
}

impl<B, SQ, AR, SP, OB, TS> LedgerApi for LedgerService<B, SQ, AR, SP, OB, TS>
where
    B: LedgerBackend,
    SQ: SequenceStore,
    AR: AuthorizationRegistry,
    SP: SigningProvider,
    OB: BlobStore,
    TS: TimeSource,
{
    fn append(&self, payload: Vec<u8>, signer: SignerId) -> Result<Block, LedgerError> {
        let size = payload.len() as u64;
        if size > self.config.max_payload_size {
            return Err(LedgerError::PayloadTooLarge {
                size,
                max: self.config.max_payload_size,
            });
        }

        let now = self.time.now();
        if !self.registry.is_authorized(&signer, now) {
            return Err(LedgerError::NotAuthorized {
                identity: signer,
                at: now,
            });
        }
        if self.registry.current_key_for(&signer).is_none() {
            return Err(LedgerError::UnknownSigner { identity: signer });
        }

        // Off-chain placement happens before the exclusive section; only
        // the reference participates in hashing.
        let (payload, external_ref) = self.place_payload(payload)?;

        let result = self.commit_block(payload, external_ref.clone(), signer, now);
        if result.is_err() {
            // An aborted append must not strand its off-chain payload.
            if let Some(reference) = &external_ref {
                if let Err(e) = self.blobs.release(reference) {
                    tracing::warn!(
                        "[pc-01] ⚠️ Orphaned off-chain payload '{}' could not be released: {}",
                        reference.token,
                        e
                    );
                }
            }
        }
        result
    }

    fn get_by_number(&self, sequence: u64) -> Result<Block, LedgerError> {
        let record = self
            .chain
            .optimistic_read(|backend| backend.get_by_number(sequence))?
            .ok_or(LedgerError::BlockNotFound { sequence })?;
        Ok(record.verify()?.clone())
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Block, LedgerError> {
        let record = self
            .chain
            .optimistic_read(|backend| backend.get_by_hash(hash))?
            .ok_or_else(|| LedgerError::HashNotFound {
                hash_prefix: short_hash(hash),
            })?;
        Ok(record.verify()?.clone())
    }

    fn tail(&self) -> Result<Option<Block>, LedgerError> {
        match self.chain.optimistic_read(|backend| backend.tail())? {
            Some(record) => Ok(Some(record.verify()?.clone())),
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<u64, LedgerError> {
        self.len()
    }

    fn for_each_batch(
        &self,
        batch_size: usize,
        visit: &mut dyn FnMut(&[Block]) -> Result<(), LedgerError>,
    ) -> Result<u64, LedgerError> {
        if batch_size == 0 {
            return Err(LedgerError::InvalidLimit { limit: 0 });
        }

        let mut after: Option<u64> = None;
        let mut visited = 0u64;
        loop {
            // One short optimistic read per batch; writers interleave
            // between batches.
            let records = self
                .chain
                .optimistic_read(|backend| backend.range_after(after, batch_size))?;
            if records.is_empty() {
                break;
            }

            let mut blocks = Vec::with_capacity(records.len());
            for record in &records {
                blocks.push(record.verify()?.clone());
            }
            if let Some(last) = blocks.last() {
                after = Some(last.sequence());
            }
            visited += blocks.len() as u64;
            visit(&blocks)?;
        }
        Ok(visited)
    }

    fn truncate_after(&self, sequence: u64) -> Result<u64, LedgerError> {
        let mut chain = self.chain.write();
        let mut removed = 0u64;

        loop {
            let batch = chain.take_range_after(sequence, self.config.truncate_batch_size)?;
            if batch.is_empty() {
                break;
            }
            for record in &batch {
                if let Some(reference) = &record.block.envelope.external_ref {
                    if let Err(e) = self.blobs.release(reference) {
                        // Cleanup failures must not stall the truncation.
                        tracing::warn!(
                            "[pc-01] Failed to release blob '{}': {}",
                            reference.token,
                            e
                        );
                    }
                }
            }
            removed += batch.len() as u64;
        }

        if removed > 0 {
            self.sequencer.reset_to(sequence.saturating_add(1))?;
            tracing::info!(
                "[pc-01] ✂ Truncated {} block(s) after sequence {}",
                removed,
                sequence
            );
        }
        Ok(removed)
    }

    fn paginate(&self, offset: u64, limit: usize) -> Result<Vec<Block>, LedgerError> {
        if limit == 0 {
            return Err(LedgerError::InvalidLimit { limit: 0 });
        }
        let limit = limit.min(self.config.max_page_size);

        let records = self
            .chain
            .optimistic_read(|backend| backend.page(offset, limit))?;
        let mut blocks = Vec::with_capacity(records.len());
        for record in &records {
            blocks.push(record.verify()?.clone());
        }
        Ok(blocks)
    }

    fn update_envelope(&self, candidate: Block) -> Result<Block, LedgerError> {
        candidate.envelope.validate(&self.config.envelope_limits)?;

        let sequence = candidate.sequence();
        let now = self.time.now();
        let mut chain = self.chain.write();

        let stored = chain
            .get_by_number(sequence)?
            .ok_or(LedgerError::BlockNotFound { sequence })?;
        let stored_block = stored.verify()?;

        if !stored_block.immutable_fields_match(&candidate) {
            return Err(LedgerError::ImmutableFieldMutation { sequence });
        }

        let mut updated = stored_block.clone();
        updated.envelope = candidate.envelope;
        chain.put_record(StoredRecord::seal(updated.clone(), now)?)?;

        tracing::debug!("[pc-01] Envelope updated for block #{}", sequence);
        Ok(updated)
    }
}
