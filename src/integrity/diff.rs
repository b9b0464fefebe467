//! Integrity checker: classify the differences between two snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::snapshot::SecretSnapshot;

/// Classification of every secret name appearing in either snapshot.
///
/// The four categories partition `keys(previous) ∪ keys(current)`: each name
/// lands in exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Present in current, absent in previous
    pub added: BTreeSet<String>,

    /// Present in previous, absent in current
    pub removed: BTreeSet<String>,

    /// Present in both with a different value
    pub changed: BTreeSet<String>,

    /// Present in both with the same value
    pub unchanged: usize,
}

impl DiffResult {
    /// True when anything was added, removed or changed
    pub fn has_drift(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty())
    }

    /// Number of distinct names classified
    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len() + self.unchanged
    }
}

/// Compare a previously persisted snapshot with a freshly fetched one.
///
/// Values are compared by exact equality. Either snapshot may be empty.
/// Snapshots are validated when built, so this cannot fail.
pub fn compare(previous: &SecretSnapshot, current: &SecretSnapshot) -> DiffResult {
    let mut diff = DiffResult::default();

    for (name, entry) in previous.iter() {
        match current.get(name) {
            None => {
                diff.removed.insert(name.to_string());
            }
            Some(now) if now.value != entry.value => {
                diff.changed.insert(name.to_string());
            }
            Some(_) => diff.unchanged += 1,
        }
    }

    diff.added =
        current.names().filter(|name| !previous.contains(name)).map(str::to_string).collect();

    debug!(
        added = diff.added.len(),
        removed = diff.removed.len(),
        changed = diff.changed.len(),
        unchanged = diff.unchanged,
        "Compared snapshots"
    );

    diff
}
