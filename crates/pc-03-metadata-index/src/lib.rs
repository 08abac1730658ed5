//! # Metadata Indexing (pc-03)
//!
//! Derives searchable metadata for committed blocks and coordinates
//! exactly-once-in-effect indexing under concurrent producers.
//!
//! ## Two Layers Per Block
//!
//! ```text
//! Block ──→ [term extraction + manual terms] ──→ [visibility partition]
//!                                                  │            │
//!                                              PUBLIC        PRIVATE
//!                                                  │            │
//!                                                  ↓            ↓
//!                                          cleartext layer   AEAD layer
//!                                          (category +       (keywords +
//!                                           keywords)         details)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Deterministic Layers | Same block + config ⇒ identical bytes |
//! | 2 | Serialized Per Hash | At most one in-flight indexing per hash |
//! | 3 | Retryable Failure | A failed attempt never wedges the hash |
//! | 4 | Idempotent Re-Index | Indexing an indexed hash is a cheap no-op |
//! | 5 | Batch Isolation | One block's failure never aborts a batch |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure logic: term extraction, visibility, layer generation
//! - `ports/` - Index store trait plus the in-memory reference adapter
//! - `coordinator.rs` - The per-hash exclusion protocol

pub mod coordinator;
pub mod domain;
pub mod ports;

// Re-export key types for convenience
pub use coordinator::{BatchOutcome, IndexOutcome, IndexState, IndexingCoordinator};
pub use domain::errors::IndexError;
pub use domain::layers::{
    decrypt_private_layer, generate_layers, MetadataLayers, PrivateLayer, PublicLayer,
};
pub use domain::terms::extract_terms;
pub use domain::visibility::{normalize_term, TermVisibility, VisibilityConfig};
pub use ports::outbound::{IndexedEntry, InMemoryIndexStore, MetadataIndexStore};
