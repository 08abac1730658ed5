//! # Search Engine (pc-04)
//!
//! Answers queries over the metadata index and, at deeper levels, over
//! the block payloads themselves.
//!
//! ## Search Depths
//!
//! ```text
//! KeywordOnly        index terms (public + decrypted private)     fastest
//! KeywordAndContent  + raw on-ledger payload scan
//! Exhaustive         + resolution of off-chain payloads           slowest
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Bounded Results | Every query carries `max_results > 0` |
//! | 2 | Term Hygiene | Short terms rejected unless a known exception |
//! | 3 | Key Gate | Private terms are invisible without the right key |
//! | 4 | Tagged Decryption | Absent vs. undecryptable is never ambiguous |
//!
//! ## Crate Structure
//!
//! - `query.rs` - Query model and validation
//! - `results.rs` - Result set, relevance, grouping, JSON rendering
//! - `engine.rs` - The search service over index, ledger, and blob store

pub mod engine;
pub mod query;
pub mod results;

// Re-export key types for convenience
pub use engine::{DecryptOutcome, SearchService};
pub use query::{SearchConfig, SearchDepth, SearchError, SearchQuery};
pub use results::{SearchMatch, SearchResultSet};
