//! Discovery ledger: at-most-once gate for discoveries.
//!
//! The ledger only answers "is this new" and records the answer. Emitting
//! events for committed records is the caller's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::classify::Category;
use crate::error::AlreadyDiscovered;
use crate::memory::Address;

/// A delta promoted to a permanent discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub address: Address,
    /// Value before the discovering transition
    pub previous_value: u8,
    pub first_seen_value: u8,
    /// Frame (or step) at which the discovery was committed
    pub discovered_at: u64,
    pub category: Category,
}

/// How the ledger keys its records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LedgerMode {
    /// One discovery per address
    #[default]
    PerAddress,
    /// One discovery per address and `(before, after)` transition
    PerTransition,
}

type LedgerKey = (Address, Option<(u8, u8)>);

#[derive(Debug, Clone, Default)]
pub struct DiscoveryLedger {
    mode: LedgerMode,
    records: Vec<DiscoveryRecord>,
    keys: HashSet<LedgerKey>,
    addresses: HashSet<Address>,
}

impl DiscoveryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: LedgerMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> LedgerMode {
        self.mode
    }

    fn key(&self, address: Address, before: u8, after: u8) -> LedgerKey {
        match self.mode {
            LedgerMode::PerAddress => (address, None),
            LedgerMode::PerTransition => (address, Some((before, after))),
        }
    }

    /// Whether any discovery was committed at `address`
    pub fn contains(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    pub fn commit(&mut self, record: DiscoveryRecord) -> Result<(), AlreadyDiscovered> {
        let key = self.key(
            record.address,
            record.previous_value,
            record.first_seen_value,
        );
        if !self.keys.insert(key) {
            return Err(AlreadyDiscovered {
                address: record.address,
            });
        }

        self.addresses.insert(record.address);
        self.records.push(record);
        Ok(())
    }

    /// Forget every record so addresses can be rediscovered
    pub fn reset(&mut self) {
        debug!("Clearing {} discovery records", self.records.len());
        self.records.clear();
        self.keys.clear();
        self.addresses.clear();
    }

    /// Records in commit order
    pub fn all(&self) -> &[DiscoveryRecord] {
        &self.records
    }

    pub fn get(&self, address: Address) -> Option<&DiscoveryRecord> {
        self.records.iter().find(|r| r.address == address)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: Address, at: u64) -> DiscoveryRecord {
        DiscoveryRecord {
            address,
            previous_value: 0,
            first_seen_value: 1,
            discovered_at: at,
            category: Category::ItemFlag,
        }
    }

    #[test]
    fn test_commit_once() {
        let mut ledger = DiscoveryLedger::new();
        assert!(!ledger.contains(0xDB02));

        ledger.commit(record(0xDB02, 10)).unwrap();
        assert!(ledger.contains(0xDB02));

        let err = ledger.commit(record(0xDB02, 20)).unwrap_err();
        assert_eq!(err, AlreadyDiscovered { address: 0xDB02 });
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0xDB02).unwrap().discovered_at, 10);
    }

    #[test]
    fn test_all_in_insertion_order() {
        let mut ledger = DiscoveryLedger::new();
        ledger.commit(record(0xDB10, 1)).unwrap();
        ledger.commit(record(0xDB02, 2)).unwrap();
        ledger.commit(record(0xDB05, 3)).unwrap();

        let order: Vec<_> = ledger.all().iter().map(|r| r.address).collect();
        assert_eq!(order, vec![0xDB10, 0xDB02, 0xDB05]);
    }

    #[test]
    fn test_reset_allows_rediscovery() {
        let mut ledger = DiscoveryLedger::new();
        ledger.commit(record(0xDB02, 1)).unwrap();
        ledger.reset();

        assert!(ledger.is_empty());
        assert!(!ledger.contains(0xDB02));
        ledger.commit(record(0xDB02, 5)).unwrap();
        assert_eq!(ledger.all()[0].discovered_at, 5);
    }

    #[test]
    fn test_per_transition_mode() {
        let mut ledger = DiscoveryLedger::with_mode(LedgerMode::PerTransition);
        ledger.commit(record(0xDB44, 1)).unwrap();

        let upgrade = DiscoveryRecord {
            previous_value: 1,
            first_seen_value: 2,
            ..record(0xDB44, 2)
        };
        ledger.commit(upgrade).unwrap();

        assert!(ledger.commit(record(0xDB44, 3)).is_err());
        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains(0xDB44));
    }
}
