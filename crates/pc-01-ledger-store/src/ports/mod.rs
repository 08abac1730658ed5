//! # Ports Layer
//!
//! - `inbound` - the API this crate exposes to embedders
//! - `outbound` - the SPI this crate requires (backend, registry, keyring,
//!   blob store, time source) plus in-memory reference adapters

pub mod inbound;
pub mod outbound;
