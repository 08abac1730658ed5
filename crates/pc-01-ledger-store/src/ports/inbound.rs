//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the Ledger Store. Implementations must enforce every
//! domain invariant listed in the crate docs.

use crate::domain::errors::LedgerError;
use shared_types::{Block, Hash, SignerId};

/// Primary API for the Ledger Store subsystem.
///
/// There is deliberately no load-everything operation: whole-ledger work
/// goes through [`LedgerApi::for_each_batch`] so memory stays bounded by
/// the batch size, not the ledger length.
pub trait LedgerApi {
    /// Append a payload as a new signed block.
    ///
    /// Validates authorization, reserves a sequence number, links to the
    /// current tail (genesis sentinel on an empty ledger), hashes, signs,
    /// and persists atomically. A failure after sequence reservation leaves
    /// a gap; the number is never reused.
    ///
    /// ## Errors
    ///
    /// - `PayloadTooLarge`: payload above the absolute limit (caller error)
    /// - `NotAuthorized`: signer not authorized now; nothing persisted
    /// - `SequenceUnavailable`: counter storage down; nothing constructed
    /// - `SigningFailed` / `Backend`: reserved number is lost (gap)
    fn append(&self, payload: Vec<u8>, signer: SignerId) -> Result<Block, LedgerError>;

    /// Point lookup by sequence number.
    fn get_by_number(&self, sequence: u64) -> Result<Block, LedgerError>;

    /// Point lookup by content hash.
    fn get_by_hash(&self, hash: &Hash) -> Result<Block, LedgerError>;

    /// The newest committed block, or `None` on an empty ledger.
    fn tail(&self) -> Result<Option<Block>, LedgerError>;

    /// Total number of committed blocks.
    fn count(&self) -> Result<u64, LedgerError>;

    /// Traverse the whole ledger in fixed-size batches, invoking `visit`
    /// once per batch. Each batch is released before the next is fetched;
    /// memory is bounded by `batch_size`. Returns the number of blocks
    /// visited.
    ///
    /// ## Errors
    ///
    /// - `InvalidLimit`: `batch_size` is zero (caller error)
    /// - any error returned by `visit` aborts the traversal
    fn for_each_batch(
        &self,
        batch_size: usize,
        visit: &mut dyn FnMut(&[Block]) -> Result<(), LedgerError>,
    ) -> Result<u64, LedgerError>;

    /// Remove all blocks after `sequence`, releasing their off-chain
    /// references batch by batch. A no-op (returning 0) when the ledger is
    /// already no longer than `sequence + 1`. Returns the removed count.
    fn truncate_after(&self, sequence: u64) -> Result<u64, LedgerError>;

    /// Page through the ledger ordered by sequence number. `offset` is
    /// 64-bit so multi-billion-record ledgers cannot overflow it; `limit`
    /// is capped by the configured maximum.
    ///
    /// ## Errors
    ///
    /// - `InvalidLimit`: `limit` is zero (caller error)
    fn paginate(&self, offset: u64, limit: usize) -> Result<Vec<Block>, LedgerError>;

    /// Replace a block's metadata envelope.
    ///
    /// The candidate must match the stored block on every hash-critical
    /// field; only the envelope is taken from it. Returns the updated
    /// block.
    ///
    /// ## Errors
    ///
    /// - `ImmutableFieldMutation`: candidate touches a write-once field;
    ///   the stored block is unchanged
    /// - `Envelope(..)`: envelope boundary limits violated
    /// - `BlockNotFound`: no block at the candidate's sequence
    fn update_envelope(&self, candidate: Block) -> Result<Block, LedgerError>;
}
