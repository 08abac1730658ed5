//! # Ledger Store (pc-01)
//!
//! The Ledger Store is the authoritative owner of the block chain: it
//! sequences, links, signs, and persists blocks, and it is the only
//! subsystem allowed to remove them (audited truncation).
//!
//! ## Append Pipeline
//!
//! ```text
//! caller ──append(payload, signer)──→ [authorize] ──→ [reserve sequence]
//!                                          │                │
//!                                          ↓                ↓
//!                                   [previous hash]   [content hash + sign]
//!                                          │                │
//!                                          └───→ [atomic persist] ───→ Block
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Unique Sequencing | No two appends observe the same number |
//! | 2 | Commit Order | Sequence numbers reflect the total commit order |
//! | 3 | Record Integrity | CRC32 checksum verified on every read |
//! | 4 | Envelope-Only Mutation | Hash-critical fields are write-once |
//! | 5 | Bounded Traversal | Whole-ledger work runs in fixed-size batches |
//! | 6 | Gap Tolerance | Aborted appends leave gaps, never duplicates |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (sequencer, chain lock, records, config)
//! - `ports/` - Port traits (inbound API, outbound SPI) and reference adapters
//! - `service.rs` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use pc_01_ledger_store::{LedgerConfig, LedgerService};
//!
//! let service = LedgerService::new_in_memory(LedgerConfig::default());
//! let block = service.append(b"record".to_vec(), "clerk-1".into())?;
//! let tail = service.tail()?;
//! ```

pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::chain_lock::ChainLock;
pub use domain::config::LedgerConfig;
pub use domain::errors::{BackendError, BlobError, LedgerError, SigningError};
pub use domain::records::StoredRecord;
pub use domain::sequencer::BlockSequencer;
pub use ports::inbound::LedgerApi;
pub use ports::outbound::{
    AuthorizationRegistry, BlobStore, FixedTimeSource, InMemoryBackend, InMemoryBlobStore,
    InMemoryKeyring, InMemoryRegistry, InMemorySequence, LedgerBackend, SequenceStore,
    SigningProvider, SystemTimeSource, TimeSource,
};
pub use service::{InMemoryLedger, LedgerService};
