//! Append-only per-phase report ledger
//!
//! Explicit caller-visible state instead of a hidden singleton, so parallel
//! coordinators (and parallel tests) stay isolated. Reports are appended,
//! never mutated; `clear` is the only way to drop history.

use parking_lot::RwLock;

/// Append-only list of reports for one phase
#[derive(Debug, Default)]
pub struct PhaseLedger<T> {
    entries: RwLock<Vec<T>>,
}

impl<T: Clone> PhaseLedger<T> {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Append a report
    pub fn push(&self, report: T) {
        self.entries.write().push(report);
    }

    /// The most recent report, if any
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.entries.read().last().cloned()
    }

    /// Every report, in append order
    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.entries.read().clone()
    }

    /// Number of appended reports
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the ledger is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop all history
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
