use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::Category;
use crate::snapshot::Delta;

/// Which transitions of a candidate may be committed as a discovery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiscoveryRule {
    /// Only `0 -> 1`. Every other transition, `1 -> 0` included, stays
    /// informational.
    ZeroToOne,
    /// Any change
    AnyChange,
    /// Any rise in value
    Increase,
    /// Never commits; deltas are still reported
    Never,
}

impl DiscoveryRule {
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::ItemFlag => DiscoveryRule::ZeroToOne,
            _ => DiscoveryRule::AnyChange,
        }
    }

    pub fn admits(&self, delta: &Delta) -> bool {
        match self {
            DiscoveryRule::ZeroToOne => delta.before() == 0 && delta.after() == 1,
            DiscoveryRule::AnyChange => delta.before() != delta.after(),
            DiscoveryRule::Increase => delta.signed_diff() > 0,
            DiscoveryRule::Never => false,
        }
    }
}
