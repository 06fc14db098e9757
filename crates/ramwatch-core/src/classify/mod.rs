//! Classification of deltas into ignored or candidate changes.
//!
//! Rules, in order:
//! 1. an address in the [`IgnoreSet`] is `Ignored`, whatever the magnitude
//! 2. otherwise the [`CategoryTable`] assigns a [`Category`]
//! 3. the magnitude is tagged `Prominent` for `1..=50`, `Outlier` beyond
//!
//! Whether a candidate becomes a discovery is decided separately by the
//! category's [`DiscoveryRule`].

mod rule;
mod table;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::snapshot::Delta;

pub use rule::DiscoveryRule;
pub use table::{CategoryTable, IgnoreSet};

/// Smallest change surfaced prominently by reports
pub const MEANINGFUL_MIN: u16 = 1;
/// Largest change surfaced prominently by reports
pub const MEANINGFUL_MAX: u16 = 50;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Position,
    ItemFlag,
    MapTransition,
    Health,
    Uncategorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Magnitude {
    /// `1 <= |diff| <= 50`
    Prominent,
    /// Larger swings, typically multi-byte counters
    Outlier,
}

impl Magnitude {
    pub fn of(delta: &Delta) -> Self {
        if (MEANINGFUL_MIN..=MEANINGFUL_MAX).contains(&delta.magnitude()) {
            Magnitude::Prominent
        } else {
            Magnitude::Outlier
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    Ignored,
    Candidate {
        category: Category,
        magnitude: Magnitude,
    },
}

impl Classification {
    pub fn category(&self) -> Option<Category> {
        match self {
            Classification::Candidate { category, .. } => Some(*category),
            Classification::Ignored => None,
        }
    }

    pub fn is_candidate(&self) -> bool {
        matches!(self, Classification::Candidate { .. })
    }

    pub fn is_prominent(&self) -> bool {
        matches!(
            self,
            Classification::Candidate {
                magnitude: Magnitude::Prominent,
                ..
            }
        )
    }
}

/// Classify one delta. Ignore-set membership is checked before any
/// category lookup.
pub fn classify(delta: &Delta, ignore: &IgnoreSet, table: &CategoryTable) -> Classification {
    if ignore.contains(delta.address()) {
        return Classification::Ignored;
    }

    Classification::Candidate {
        category: table.lookup(delta.address()),
        magnitude: Magnitude::of(delta),
    }
}

/// Ignore set, category table and per-category discovery rules.
#[derive(Debug, Clone, Default)]
pub struct ClassificationPolicy {
    ignore: IgnoreSet,
    table: CategoryTable,
    rules: BTreeMap<Category, DiscoveryRule>,
}

impl ClassificationPolicy {
    pub fn new(ignore: IgnoreSet, table: CategoryTable) -> Self {
        Self {
            ignore,
            table,
            rules: BTreeMap::new(),
        }
    }

    /// Override the discovery rule of one category
    pub fn with_rule(mut self, category: Category, rule: DiscoveryRule) -> Self {
        self.rules.insert(category, rule);
        self
    }

    pub fn classify(&self, delta: &Delta) -> Classification {
        classify(delta, &self.ignore, &self.table)
    }

    pub fn rule_for(&self, category: Category) -> DiscoveryRule {
        self.rules
            .get(&category)
            .copied()
            .unwrap_or_else(|| DiscoveryRule::default_for(category))
    }

    /// Whether a classified delta is eligible to become a discovery
    pub fn is_discovery(&self, delta: &Delta, classification: &Classification) -> bool {
        match classification.category() {
            Some(category) => self.rule_for(category).admits(delta),
            None => false,
        }
    }

    pub fn ignore_set(&self) -> &IgnoreSet {
        &self.ignore
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::AddressRange;
    use proptest::prelude::*;

    fn policy() -> ClassificationPolicy {
        let ignore: IgnoreSet = [0xC00C, 0xFF98].into_iter().collect();
        let table = CategoryTable::new()
            .with(AddressRange::new(0xC008, 0xC009).unwrap(), Category::Position)
            .with(AddressRange::new(0xDB00, 0xDBFF).unwrap(), Category::ItemFlag)
            .with(AddressRange::single(0xDB5A), Category::Health);
        ClassificationPolicy::new(ignore, table)
    }

    #[test]
    fn test_ignored_regardless_of_magnitude() {
        let policy = policy();
        assert_eq!(
            policy.classify(&Delta::new(0xC00C, 0, 1)),
            Classification::Ignored
        );
        assert_eq!(
            policy.classify(&Delta::new(0xC00C, 0, 255)),
            Classification::Ignored
        );
    }

    #[test]
    fn test_category_lookup() {
        let policy = policy();
        assert_eq!(
            policy.classify(&Delta::new(0xDB02, 0, 1)).category(),
            Some(Category::ItemFlag)
        );
        assert_eq!(
            policy.classify(&Delta::new(0xDB5A, 24, 20)).category(),
            Some(Category::Health)
        );
        assert_eq!(
            policy.classify(&Delta::new(0x0050, 1, 2)).category(),
            Some(Category::Uncategorized)
        );
    }

    #[test]
    fn test_magnitude_boundaries() {
        assert_eq!(Magnitude::of(&Delta::new(0, 0, 1)), Magnitude::Prominent);
        assert_eq!(Magnitude::of(&Delta::new(0, 100, 50)), Magnitude::Prominent);
        assert_eq!(Magnitude::of(&Delta::new(0, 0, 51)), Magnitude::Outlier);
        assert_eq!(Magnitude::of(&Delta::new(0, 200, 50)), Magnitude::Outlier);
    }

    #[test]
    fn test_flag_discovery_only_on_zero_to_one() {
        let policy = policy();
        let rise = Delta::new(0xDB02, 0, 1);
        let fall = Delta::new(0xDB02, 1, 0);
        let other = Delta::new(0xDB02, 0, 2);

        assert!(policy.is_discovery(&rise, &policy.classify(&rise)));
        assert!(!policy.is_discovery(&fall, &policy.classify(&fall)));
        assert!(!policy.is_discovery(&other, &policy.classify(&other)));
    }

    #[test]
    fn test_rule_override() {
        let policy = policy().with_rule(Category::ItemFlag, DiscoveryRule::Never);
        let rise = Delta::new(0xDB02, 0, 1);
        assert!(!policy.is_discovery(&rise, &policy.classify(&rise)));
        assert_eq!(policy.rule_for(Category::Position), DiscoveryRule::AnyChange);
    }

    #[test]
    fn test_ignored_is_never_discovery() {
        let policy = policy();
        let delta = Delta::new(0xFF98, 0, 1);
        assert!(!policy.is_discovery(&delta, &policy.classify(&delta)));
    }

    #[test]
    fn test_category_names() {
        assert_eq!(Category::ItemFlag.to_string(), "item_flag");
        assert_eq!(
            "map_transition".parse::<Category>().unwrap(),
            Category::MapTransition
        );
        assert!("weapon".parse::<Category>().is_err());
    }

    proptest! {
        #[test]
        fn property_ignored_addresses_never_candidates(
            address in prop::sample::select(vec![0xC00Cu16, 0xFF98u16]),
            before in any::<u8>(),
            after in any::<u8>(),
        ) {
            let policy = policy();
            let delta = Delta::new(address, before, after);
            let classification = policy.classify(&delta);
            prop_assert_eq!(classification, Classification::Ignored);
            prop_assert!(!policy.is_discovery(&delta, &classification));
        }
    }
}
