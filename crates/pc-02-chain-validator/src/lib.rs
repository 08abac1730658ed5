//! # Chain Validator (pc-02)
//!
//! Walks the ledger checking two independent properties, reported
//! separately because they have different remediation paths:
//!
//! - **Structural integrity**: every block's previous-hash links to the
//!   recomputed hash of its predecessor, its content hash matches its
//!   preimage, and its signature verifies against the signer's key. One
//!   structural failure means the ledger cannot be trusted from that point
//!   forward.
//! - **Authorization compliance**: every block's signer was authorized
//!   (and not yet revoked) at the block's timestamp. A compliance failure
//!   does not imply tampering; a since-revoked signer may have produced a
//!   block that was valid at the time.
//!
//! Validation runs over the ledger's batched traversal so memory stays
//! bounded regardless of ledger size. The single-scan convenience variant
//! refuses ledgers above a configured hard cap and directs the caller to
//! the batched variant instead of exhausting memory.
//!
//! Findings accumulate into a [`ValidationReport`] with counts plus
//! bounded sample lists, never an unbounded in-memory list.

pub mod report;
pub mod validator;

pub use report::{
    ComplianceFinding, StructuralFinding, StructuralIssue, ValidationReport,
};
pub use validator::{ChainValidator, ValidationError, ValidatorConfig};
