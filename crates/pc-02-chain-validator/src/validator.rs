//! # Chain Validator Service
//!
//! Batched-traversal validation over a [`LedgerApi`] implementation plus
//! an [`AuthorizationRegistry`].

use crate::report::{
    ComplianceFinding, StructuralFinding, StructuralIssue, ValidationReport,
};
use pc_01_ledger_store::{AuthorizationRegistry, LedgerApi, LedgerError};
use serde::Serialize;
use shared_crypto::{blake3_hash, Ed25519PublicKey, Ed25519Signature};
use shared_types::{short_hash, Block, GENESIS_PARENT_HASH};
use std::sync::Arc;
use thiserror::Error;

/// Validator tuning.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatorConfig {
    /// Maximum findings kept per sample list.
    pub sample_cap: usize,
    /// `validate` refuses ledgers with more blocks than this; callers are
    /// directed to `validate_batched`.
    pub single_scan_cap: u64,
    /// Batch size used by the underlying traversal.
    pub batch_size: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            sample_cap: 32,
            single_scan_cap: 100_000,
            batch_size: 1_000,
        }
    }
}

/// Errors terminating a validation run (findings are not errors; they go
/// into the report).
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The ledger exceeds the single-scan hard cap.
    #[error(
        "Ledger has {count} blocks, above the single-scan cap of {cap}; \
         use validate_batched instead"
    )]
    LedgerTooLarge { count: u64, cap: u64 },

    /// The traversal itself failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Walks the chain, accumulating structural and compliance findings.
pub struct ChainValidator<L, AR>
where
    L: LedgerApi,
    AR: AuthorizationRegistry,
{
    ledger: Arc<L>,
    registry: Arc<AR>,
    config: ValidatorConfig,
}

impl<L, AR> ChainValidator<L, AR>
where
    L: LedgerApi,
    AR: AuthorizationRegistry,
{
    /// Create a validator over the given ledger and registry.
    pub fn new(ledger: Arc<L>, registry: Arc<AR>, config: ValidatorConfig) -> Self {
        Self {
            ledger,
            registry,
            config,
        }
    }

    /// Single bounded scan. Refuses ledgers above the configured cap.
    ///
    /// ## Errors
    ///
    /// - `LedgerTooLarge`: block count above `single_scan_cap`; use
    ///   [`ChainValidator::validate_batched`]
    pub fn validate(&self) -> Result<ValidationReport, ValidationError> {
        let count = self.ledger.count()?;
        if count > self.config.single_scan_cap {
            return Err(ValidationError::LedgerTooLarge {
                count,
                cap: self.config.single_scan_cap,
            });
        }
        self.validate_batched()
    }

    /// Full validation over the batched traversal; memory is bounded by
    /// the batch size regardless of ledger length.
    pub fn validate_batched(&self) -> Result<ValidationReport, ValidationError> {
        let mut report = ValidationReport::new(self.config.sample_cap);
        // Hash of the previously visited block, carried across batches.
        let mut previous_hash = GENESIS_PARENT_HASH;

        self.ledger.for_each_batch(self.config.batch_size, &mut |blocks| {
            for block in blocks {
                self.check_block(block, previous_hash, &mut report);
                previous_hash = block.content_hash;
                report.blocks_checked += 1;
            }
            Ok(())
        })?;

        tracing::info!(
            "[pc-02] 🔍 Validated {} block(s): {} structural, {} compliance failure(s)",
            report.blocks_checked,
            report.structural_failures,
            report.compliance_failures
        );
        Ok(report)
    }

    fn check_block(&self, block: &Block, previous_hash: [u8; 32], report: &mut ValidationReport) {
        let sequence = block.sequence();
        let hash_prefix = short_hash(&block.content_hash);

        // Linkage: previous_hash must equal the hash of the predecessor
        // (the genesis sentinel for the first block).
        if block.header.previous_hash != previous_hash {
            report.record_structural(StructuralFinding {
                sequence,
                hash_prefix: hash_prefix.clone(),
                issue: StructuralIssue::BrokenLink {
                    expected_prefix: short_hash(&previous_hash),
                    actual_prefix: short_hash(&block.header.previous_hash),
                },
            });
        }

        // The stored content hash must match the block's own preimage.
        let recomputed = blake3_hash(&Block::content_preimage(&block.header, &block.payload));
        if recomputed != block.content_hash {
            report.record_structural(StructuralFinding {
                sequence,
                hash_prefix: hash_prefix.clone(),
                issue: StructuralIssue::ContentHashMismatch,
            });
        }

        // Signature against the key bound to the signer at signing time.
        // Revocation does not erase the binding; a since-revoked signer's
        // blocks still verify structurally and fail compliance only.
        let key_bytes = self
            .registry
            .key_for_at(&block.header.signer, block.header.timestamp)
            .or_else(|| self.registry.current_key_for(&block.header.signer));
        match key_bytes.and_then(|bytes| Ed25519PublicKey::from_bytes(bytes).ok()) {
            Some(key) => {
                let signature = Ed25519Signature::from_bytes(*block.signature.as_bytes());
                if key.verify(&block.content_hash, &signature).is_err() {
                    report.record_structural(StructuralFinding {
                        sequence,
                        hash_prefix: hash_prefix.clone(),
                        issue: StructuralIssue::SignatureInvalid,
                    });
                }
            }
            None => {
                report.record_structural(StructuralFinding {
                    sequence,
                    hash_prefix,
                    issue: StructuralIssue::SignerKeyUnavailable,
                });
            }
        }

        // Compliance is independent of the hash chain.
        if !self
            .registry
            .is_authorized(&block.header.signer, block.header.timestamp)
        {
            report.record_compliance(ComplianceFinding {
                sequence,
                signer: block.header.signer.clone(),
                timestamp: block.header.timestamp,
            });
        }
    }
}
