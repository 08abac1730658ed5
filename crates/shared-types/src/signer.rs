//! # Authorized Signer Records
//!
//! Identity-to-public-key bindings with activation and revocation
//! timestamps. Multiple historical records may exist per identity; only the
//! most recent un-revoked record is active, but history is retained so old
//! blocks can be validated against the key that was valid when they were
//! signed.

use crate::{SignerId, Timestamp};
use serde::{Deserialize, Serialize};

/// One historical identity-to-key binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedSigner {
    /// Signer identity this record binds.
    pub identity: SignerId,
    /// Ed25519 public key bytes.
    pub public_key: [u8; 32],
    /// Timestamp from which the binding is valid.
    pub activated_at: Timestamp,
    /// Timestamp at which the binding was revoked, if it was.
    pub revoked_at: Option<Timestamp>,
}

impl AuthorizedSigner {
    /// True when this record covered `at`: activated on or before it, and
    /// not yet revoked at that instant.
    pub fn was_authorized_at(&self, at: Timestamp) -> bool {
        if self.activated_at > at {
            return false;
        }
        match self.revoked_at {
            Some(revoked) => at < revoked,
            None => true,
        }
    }

    /// True when the record is currently un-revoked.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}
