//! # Permachain Test Suite
//!
//! Unified test crate covering behavior that spans more than one crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures and tracing setup
//! └── integration/
//!     ├── properties.rs # Cross-crate concurrency and integrity properties
//!     └── scenarios.rs  # End-to-end ledger lifecycle scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pc-tests
//!
//! # By category
//! cargo test -p pc-tests integration::properties::
//! cargo test -p pc-tests integration::scenarios::
//! ```

#![allow(dead_code)]

pub mod integration;
pub mod support;
