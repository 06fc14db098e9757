use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::memory::{Address, format_address};
use crate::snapshot::Delta;

const EXAMPLES_PER_ADDRESS: usize = 3;

/// Counts, per address, how many named actions changed it.
///
/// Addresses that move in many unrelated actions are usually counters or
/// timers rather than the state an action is looking for.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAnalysis {
    changes: BTreeMap<Address, Vec<(String, Delta)>>,
    actions: usize,
}

impl FrequencyAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the deltas one action produced
    pub fn add(&mut self, action: &str, deltas: &[Delta]) {
        self.actions += 1;
        for delta in deltas {
            self.changes
                .entry(delta.address())
                .or_default()
                .push((action.to_string(), *delta));
        }
    }

    pub fn actions(&self) -> usize {
        self.actions
    }

    /// Number of actions in which `address` changed
    pub fn count(&self, address: Address) -> usize {
        self.changes.get(&address).map_or(0, Vec::len)
    }

    /// Addresses ordered by change count (descending), ties by address
    pub fn ranked(&self) -> Vec<(Address, usize)> {
        let mut ranked: Vec<_> = self
            .changes
            .iter()
            .map(|(address, changes)| (*address, changes.len()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }

    pub fn render(&self, top: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Most frequently changing addresses:");

        for (address, count) in self.ranked().into_iter().take(top) {
            let _ = writeln!(
                out,
                "{} (changed in {} actions):",
                format_address(address),
                count
            );
            let examples = self.changes.get(&address).into_iter().flatten();
            for (action, delta) in examples.take(EXAMPLES_PER_ADDRESS) {
                let _ = writeln!(
                    out,
                    "  {}: {} -> {}",
                    action,
                    delta.before(),
                    delta.after()
                );
            }
        }

        out
    }
}
