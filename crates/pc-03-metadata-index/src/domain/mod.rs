//! # Domain Layer
//!
//! Pure metadata logic: no I/O, no locks. Everything here is a function of
//! its inputs, which is what makes layer regeneration idempotent.

pub mod errors;
pub mod layers;
pub mod terms;
pub mod visibility;
