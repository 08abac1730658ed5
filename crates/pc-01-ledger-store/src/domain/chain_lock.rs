//! # Chain Lock
//!
//! The single reader-writer coordination point guarding the chain state.
//!
//! Three access modes:
//!
//! - **Optimistic read**: read the version stamp, run the closure under a
//!   non-blocking `try_read`, and trust the result only if the stamp is
//!   unchanged afterwards; otherwise fall back to the full read lock.
//! - **Conservative read**: a plain shared lock.
//! - **Exclusive write**: a write lock that bumps the version stamp on
//!   entry (odd = writer active) and again on exit.
//!
//! Appends, truncation, and envelope updates go through `write`; point
//! lookups, pagination, and validation scans use the optimistic path.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicU64, Ordering};

/// Version-stamped reader-writer lock over the chain state.
pub struct ChainLock<T> {
    version: AtomicU64,
    inner: RwLock<T>,
}

impl<T> ChainLock<T> {
    /// Wrap `value` in a fresh lock at version zero.
    pub fn new(value: T) -> Self {
        Self {
            version: AtomicU64::new(0),
            inner: RwLock::new(value),
        }
    }

    /// Conservative shared read.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    /// Exclusive write access. The version stamp is odd while the guard is
    /// alive, which invalidates any concurrent optimistic read.
    pub fn write(&self) -> ChainWriteGuard<'_, T> {
        let guard = self.inner.write();
        self.version.fetch_add(1, Ordering::AcqRel);
        ChainWriteGuard {
            version: &self.version,
            guard,
        }
    }

    /// Current version stamp. Odd means a writer is active.
    pub fn stamp(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Optimistic read: fast path without blocking writers, re-validated
    /// against the version stamp; falls back to the full read lock when a
    /// writer interfered.
    pub fn optimistic_read<R>(&self, mut f: impl FnMut(&T) -> R) -> R {
        let stamp = self.stamp();
        if stamp % 2 == 0 {
            if let Some(guard) = self.inner.try_read() {
                let result = f(&guard);
                drop(guard);
                if self.stamp() == stamp {
                    return result;
                }
            }
        }
        f(&self.inner.read())
    }
}

/// Write guard that bumps the version stamp back to even on release.
pub struct ChainWriteGuard<'a, T> {
    version: &'a AtomicU64,
    guard: RwLockWriteGuard<'a, T>,
}

impl<T> std::ops::Deref for ChainWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> std::ops::DerefMut for ChainWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for ChainWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }
}
