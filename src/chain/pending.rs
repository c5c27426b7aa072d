//! Pending commitment set
//!
//! [`PendingCommitments`] is the read-only view handed to the coordinator.
//! [`PendingCommitmentSet`] is the in-process set a chain listener feeds.

use crate::commitment::Commitment;
use std::collections::HashSet;
use std::sync::RwLock;

/// Read-only membership test over commitments observed on-chain
pub trait PendingCommitments: Send + Sync {
    /// Whether the commitment has been observed and not yet consumed
    ///
    /// Must return quickly; the coordinator calls it once per poll attempt.
    fn contains(&self, commitment: &Commitment) -> bool;
}

/// In-memory set of observed commitments
#[derive(Debug, Default)]
pub struct PendingCommitmentSet {
    inner: RwLock<HashSet<Commitment>>,
}

impl PendingCommitmentSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commitment seen on-chain
    ///
    /// Returns `false` if it was already pending.
    pub fn observe(&self, commitment: Commitment) -> bool {
        let inserted = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(commitment);
        if inserted {
            log::debug!("observed on-chain commitment {}", commitment);
        }
        inserted
    }

    /// Remove a commitment once the listener considers it consumed
    pub fn consume(&self, commitment: &Commitment) -> bool {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(commitment)
    }

    /// Number of pending commitments
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether no commitment is pending
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PendingCommitments for PendingCommitmentSet {
    fn contains(&self, commitment: &Commitment) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::commit_to_table;

    #[test]
    fn test_observe_and_consume() {
        let set = PendingCommitmentSet::new();
        let c = commit_to_table(&["a"]);

        assert!(set.is_empty());
        assert!(set.observe(c));
        assert!(!set.observe(c));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&c));

        assert!(set.consume(&c));
        assert!(!set.contains(&c));
        assert!(!set.consume(&c));
    }

    #[test]
    fn test_membership_is_exact() {
        let set = PendingCommitmentSet::new();
        set.observe(commit_to_table(&["a", "b"]));
        assert!(!set.contains(&commit_to_table(&["b", "a"])));
    }
}
