//! Directory counters.
//!
//! Lightweight `AtomicU64` counters bumped on every directory operation and
//! read back as a plain snapshot for diagnostics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters for one [`Directory`](crate::Directory).
#[derive(Debug, Default)]
pub struct DirectoryCounters {
    /// Contacts successfully added.
    pub contacts_added: AtomicU64,
    /// Contacts successfully updated.
    pub contacts_updated: AtomicU64,
    /// Contacts successfully deleted.
    pub contacts_deleted: AtomicU64,
    /// Search calls, including empty queries.
    pub searches: AtomicU64,
    /// Saves the store accepted.
    pub saves_completed: AtomicU64,
    /// Saves the store rejected (each one triggered a rollback).
    pub save_failures: AtomicU64,
    /// Add/update calls rejected for a duplicate email.
    pub rejected_duplicates: AtomicU64,
}

impl DirectoryCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            contacts_added: AtomicU64::new(0),
            contacts_updated: AtomicU64::new(0),
            contacts_deleted: AtomicU64::new(0),
            searches: AtomicU64::new(0),
            saves_completed: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            rejected_duplicates: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    #[inline]
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter at once.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            contacts_added: self.contacts_added.load(Ordering::Relaxed),
            contacts_updated: self.contacts_updated.load(Ordering::Relaxed),
            contacts_deleted: self.contacts_deleted.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            saves_completed: self.saves_completed.load(Ordering::Relaxed),
            save_failures: self.save_failures.load(Ordering::Relaxed),
            rejected_duplicates: self.rejected_duplicates.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`DirectoryCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CounterSnapshot {
    pub contacts_added: u64,
    pub contacts_updated: u64,
    pub contacts_deleted: u64,
    pub searches: u64,
    pub saves_completed: u64,
    pub save_failures: u64,
    pub rejected_duplicates: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let counters = DirectoryCounters::new();
        DirectoryCounters::inc(&counters.searches);
        DirectoryCounters::inc(&counters.searches);
        DirectoryCounters::inc(&counters.save_failures);

        let snap = counters.snapshot();
        assert_eq!(snap.searches, 2);
        assert_eq!(snap.save_failures, 1);
        assert_eq!(snap.contacts_added, 0);
    }
}
