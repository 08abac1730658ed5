//! # Ledger Configuration
//!
//! Tunable limits for the Ledger Store. Defaults are production values;
//! tests shrink them to exercise the boundaries.

use serde::{Deserialize, Serialize};
use shared_types::EnvelopeLimits;

/// Configuration for the Ledger Store service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Payloads above this size are handed to the blob store and the block
    /// carries a content reference instead of inline bytes.
    pub inline_payload_threshold: u64,
    /// Absolute payload limit; larger payloads are a caller error.
    pub max_payload_size: u64,
    /// Hard cap applied to every `paginate` limit.
    pub max_page_size: usize,
    /// Batch size used internally by truncation cleanup.
    pub truncate_batch_size: usize,
    /// Boundary limits for envelope updates.
    pub envelope_limits: EnvelopeLimits,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            inline_payload_threshold: 256 * 1024,
            max_payload_size: 10 * 1024 * 1024,
            max_page_size: 10_000,
            truncate_batch_size: 1_000,
            envelope_limits: EnvelopeLimits::default(),
        }
    }
}
