//! # Validation Report
//!
//! The bounded, structured output of a validation run. Counts are exact;
//! sample lists are capped so a run over a badly damaged multi-million
//! block ledger still produces a report of fixed size.

use serde::Serialize;
use shared_types::{SignerId, Timestamp};

/// Why a block failed the structural check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StructuralIssue {
    /// previous_hash does not match the recomputed hash of the
    /// predecessor block.
    BrokenLink {
        expected_prefix: String,
        actual_prefix: String,
    },
    /// The stored content hash does not match the block's own preimage.
    ContentHashMismatch,
    /// The signature does not verify against the signer's key.
    SignatureInvalid,
    /// No key material exists for the signer at the block's timestamp, so
    /// the signature cannot be verified at all.
    SignerKeyUnavailable,
}

/// One sampled structural failure.
#[derive(Debug, Clone, Serialize)]
pub struct StructuralFinding {
    /// Sequence number of the failing block.
    pub sequence: u64,
    /// Leading hex of the block's content hash.
    pub hash_prefix: String,
    /// What failed.
    pub issue: StructuralIssue,
}

/// One sampled compliance failure: the signer was not authorized at the
/// block's signed timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceFinding {
    /// Sequence number of the block.
    pub sequence: u64,
    /// Signer identity that was out of its authorization window.
    pub signer: SignerId,
    /// The block's signed timestamp.
    pub timestamp: Timestamp,
}

/// Summary of a validation run: exact counts, bounded samples.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Blocks examined.
    pub blocks_checked: u64,
    /// Total structural failures (may exceed the sample list length).
    pub structural_failures: u64,
    /// Total compliance failures (may exceed the sample list length).
    pub compliance_failures: u64,
    /// First `sample_cap` structural findings.
    pub structural_samples: Vec<StructuralFinding>,
    /// First `sample_cap` compliance findings.
    pub compliance_samples: Vec<ComplianceFinding>,
    /// Cap the sample lists were collected under.
    pub sample_cap: usize,
}

impl ValidationReport {
    /// Start an empty report with the given sample cap.
    pub fn new(sample_cap: usize) -> Self {
        Self {
            blocks_checked: 0,
            structural_failures: 0,
            compliance_failures: 0,
            structural_samples: Vec::new(),
            compliance_samples: Vec::new(),
            sample_cap,
        }
    }

    /// Record a structural failure, sampling up to the cap.
    pub fn record_structural(&mut self, finding: StructuralFinding) {
        self.structural_failures += 1;
        if self.structural_samples.len() < self.sample_cap {
            self.structural_samples.push(finding);
        }
    }

    /// Record a compliance failure, sampling up to the cap.
    pub fn record_compliance(&mut self, finding: ComplianceFinding) {
        self.compliance_failures += 1;
        if self.compliance_samples.len() < self.sample_cap {
            self.compliance_samples.push(finding);
        }
    }

    /// True when the run found no failures of either kind.
    pub fn is_clean(&self) -> bool {
        self.structural_failures == 0 && self.compliance_failures == 0
    }

    /// Render the report for the reporting surface.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
