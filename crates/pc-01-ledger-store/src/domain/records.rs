//! # Stored Records
//!
//! The persistence-layer wrapper around a block. It adds storage-specific
//! metadata (stored-at timestamp, CRC32 checksum) that is not part of the
//! signed block structure. The checksum covers the serialized block and is
//! verified on every read.

use crate::domain::errors::LedgerError;
use serde::{Deserialize, Serialize};
use shared_types::{Block, Timestamp};

/// A block as the backend stores it, with integrity checksum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// The committed block, envelope included.
    pub block: Block,
    /// Local storage time, not the block's signed timestamp.
    pub stored_at: Timestamp,
    /// CRC32 over the serialized block, computed at write time.
    pub checksum: u32,
}

impl StoredRecord {
    /// Wrap a block for storage, computing its checksum.
    pub fn seal(block: Block, stored_at: Timestamp) -> Result<Self, LedgerError> {
        let checksum = Self::checksum_of(&block)?;
        Ok(Self {
            block,
            stored_at,
            checksum,
        })
    }

    /// Verify the stored checksum, returning the block on success.
    pub fn verify(&self) -> Result<&Block, LedgerError> {
        let actual = Self::checksum_of(&self.block)?;
        if actual != self.checksum {
            return Err(LedgerError::RecordCorruption {
                sequence: self.block.sequence(),
                expected: self.checksum,
                actual,
            });
        }
        Ok(&self.block)
    }

    fn checksum_of(block: &Block) -> Result<u32, LedgerError> {
        let bytes = bincode::serialize(block).map_err(|e| LedgerError::Serialization {
            message: e.to_string(),
        })?;
        Ok(crc32fast::hash(&bytes))
    }
}
