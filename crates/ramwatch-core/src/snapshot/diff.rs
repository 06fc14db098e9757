use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::Snapshot;
use crate::memory::Address;

/// Before/after pair for one address that changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Delta {
    address: Address,
    before: u8,
    after: u8,
    signed_diff: i16,
}

impl Delta {
    pub(crate) fn new(address: Address, before: u8, after: u8) -> Self {
        Self {
            address,
            before,
            after,
            signed_diff: after as i16 - before as i16,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn before(&self) -> u8 {
        self.before
    }

    pub fn after(&self) -> u8 {
        self.after
    }

    /// `after - before`, never wrapped (200 -> 50 is -150)
    pub fn signed_diff(&self) -> i16 {
        self.signed_diff
    }

    pub fn magnitude(&self) -> u16 {
        self.signed_diff.unsigned_abs()
    }

    /// The same change observed in the opposite direction
    pub fn reversed(&self) -> Self {
        Self::new(self.address, self.after, self.before)
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:04X}: {} -> {} (Δ{:+})",
            self.address, self.before, self.after, self.signed_diff
        )
    }
}

/// Deltas for every address present in both snapshots whose value differs,
/// in ascending address order.
///
/// Addresses captured by only one side are skipped; disjoint snapshots
/// simply produce an empty result.
pub fn diff(before: &Snapshot, after: &Snapshot) -> Vec<Delta> {
    let mut shared = 0usize;
    let deltas: Vec<Delta> = before
        .iter()
        .filter_map(|(address, old)| {
            let new = after.get(address)?;
            shared += 1;
            (old != new).then(|| Delta::new(address, old, new))
        })
        .collect();

    if shared == 0 && !before.is_empty() && !after.is_empty() {
        debug!(
            "Snapshots at frames {} and {} share no addresses, nothing to compare",
            before.frame(),
            after.frame()
        );
    } else if shared < before.len().max(after.len()) {
        debug!(
            "Partial comparison: {} shared addresses ({} before, {} after)",
            shared,
            before.len(),
            after.len()
        );
    }

    deltas
}
