//! # Error Types
//!
//! Errors shared across subsystem boundaries. Subsystem-specific failure
//! modes live in each crate's `domain::errors`.

use thiserror::Error;

/// Envelope boundary violations. These are caller errors: the stored block
/// is untouched when any of them is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Annotation map exceeds the configured entry count.
    #[error("Too many annotations: {count} entries, max {max}")]
    TooManyAnnotations { count: usize, max: usize },

    /// Annotation key exceeds the configured length.
    #[error("Annotation key too long: {len} bytes, max {max}")]
    KeyTooLong { len: usize, max: usize },

    /// Annotation value exceeds the configured size.
    #[error("Annotation value for '{key}' too large: {len} bytes, max {max}")]
    ValueTooLarge {
        key: String,
        len: usize,
        max: usize,
    },

    /// Public keyword set exceeds the configured count.
    #[error("Too many public keywords: {count}, max {max}")]
    TooManyKeywords { count: usize, max: usize },
}
