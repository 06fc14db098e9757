use std::collections::BTreeSet;

use super::Category;
use crate::memory::{Address, AddressRange};

/// Addresses known to hold volatile state.
///
/// Deltas here are never candidates, but they still flow through
/// evaluation so debugging queries can see them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    addresses: BTreeSet<Address>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: Address) -> bool {
        self.addresses.insert(address)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }
}

impl FromIterator<Address> for IgnoreSet {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

/// Static `(range, category)` table; later entries win on overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    entries: Vec<(AddressRange, Category)>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, range: AddressRange, category: Category) -> Self {
        self.push(range, category);
        self
    }

    pub fn push(&mut self, range: AddressRange, category: Category) {
        self.entries.push((range, category));
    }

    /// Category for an address, `Uncategorized` when no entry matches
    pub fn lookup(&self, address: Address) -> Category {
        self.entries
            .iter()
            .rev()
            .find(|(range, _)| range.contains(address))
            .map(|(_, category)| *category)
            .unwrap_or(Category::Uncategorized)
    }

    pub fn entries(&self) -> &[(AddressRange, Category)] {
        &self.entries
    }
}
