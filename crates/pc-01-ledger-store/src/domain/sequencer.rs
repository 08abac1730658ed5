//! # Block Sequencer
//!
//! The sole issuer of block numbers. `next()` is a single atomic
//! increment-and-read against the sequence store; there is no window
//! between reading the current maximum and persisting a block in which a
//! concurrent caller could observe the same number.
//!
//! If the counter storage is unavailable, `next()` fails fast and the
//! caller's append aborts before any block is constructed.

use crate::domain::errors::LedgerError;
use crate::ports::outbound::SequenceStore;
use std::sync::Arc;

/// Issues strictly increasing block numbers, safe under arbitrary
/// concurrent callers.
pub struct BlockSequencer<S: SequenceStore> {
    store: Arc<S>,
}

impl<S: SequenceStore> BlockSequencer<S> {
    /// Create a sequencer over the given counter store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Reserve and return the next block number.
    ///
    /// ## Errors
    ///
    /// - `SequenceUnavailable`: counter storage cannot be reached; nothing
    ///   was reserved and a retry is safe.
    pub fn next(&self) -> Result<u64, LedgerError> {
        self.store
            .reserve_next()
            .map_err(|e| LedgerError::SequenceUnavailable {
                message: e.to_string(),
            })
    }

    /// Rewind the counter so the next issued number is `next`.
    ///
    /// Only truncation calls this, while holding the exclusive chain lock:
    /// the numbers being reclaimed are guaranteed removed, so reuse cannot
    /// produce duplicates.
    pub fn reset_to(&self, next: u64) -> Result<(), LedgerError> {
        self.store
            .reset_to(next)
            .map_err(|e| LedgerError::SequenceUnavailable {
                message: e.to_string(),
            })
    }
}
