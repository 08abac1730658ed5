//! # Domain Layer
//!
//! Pure domain logic for the Ledger Store. No I/O; everything here operates
//! on data handed in by the service layer.

pub mod chain_lock;
pub mod config;
pub mod errors;
pub mod records;
pub mod sequencer;
