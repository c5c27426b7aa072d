//! Per-name creation claims

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Names currently being created
#[derive(Debug, Default)]
pub(crate) struct ClaimSet {
    names: Mutex<HashSet<String>>,
}

impl ClaimSet {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take the claim on `name`
    ///
    /// Returns `None` if another request holds it. The claim is released when
    /// the guard drops, including when the request future is cancelled.
    pub(crate) fn claim(&self, name: &str) -> Option<ClaimGuard<'_>> {
        if self.lock().insert(name.to_string()) {
            Some(ClaimGuard {
                set: self,
                name: name.to_string(),
            })
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn is_claimed(&self, name: &str) -> bool {
        self.lock().contains(name)
    }
}

/// Held claim on a table name
#[derive(Debug)]
pub(crate) struct ClaimGuard<'a> {
    set: &'a ClaimSet,
    name: String,
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.name);
    }
}
