//! File-based configuration.
//!
//! A `WatchConfig` is read from TOML. Every section is optional and falls
//! back to the Link's Awakening DX layout in [`crate::memory::layout`].
//! Addresses are validated when the runtime types are built, so a bad file
//! fails before any session starts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::{Category, CategoryTable, ClassificationPolicy, DiscoveryRule, IgnoreSet};
use crate::error::{Error, Result};
use crate::memory::layout::{flags, link, regions, stats};
use crate::memory::{ADDRESS_SPACE_BYTES, Address, AddressRange};
use crate::report::PER_RANGE_LIMIT;
use crate::session::SessionConfig;
use crate::sink::RewardConfig;

/// A scanned range as written in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeEntry {
    pub start: u32,
    pub end: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A category table row as written in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub start: u32,
    pub end: u32,
    pub category: Category,
}

/// Where output goes and how much of it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for discovery save states
    pub state_dir: PathBuf,
    /// Delta lines printed per range in change reports
    pub per_range_limit: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("discovery_states"),
            per_range_limit: PER_RANGE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub ranges: Vec<RangeEntry>,
    pub ignore: Vec<u32>,
    pub categories: Vec<CategoryEntry>,
    /// Discovery rule overrides keyed by category name
    pub rules: BTreeMap<String, DiscoveryRule>,
    pub session: SessionConfig,
    pub output: OutputConfig,
    pub reward: RewardConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        let ranges = regions::ALL
            .iter()
            .map(|(start, end, label)| RangeEntry {
                start: *start,
                end: *end,
                label: Some(label.to_string()),
            })
            .collect();

        let single = |address: Address, category| CategoryEntry {
            start: u32::from(address),
            end: u32::from(address),
            category,
        };
        let categories = vec![
            single(link::POSITION_X, Category::Position),
            single(link::POSITION_Y, Category::Position),
            CategoryEntry {
                start: flags::START,
                end: flags::END,
                category: Category::ItemFlag,
            },
            single(stats::HEALTH, Category::Health),
        ];

        Self {
            ranges,
            ignore: crate::memory::layout::default_ignored()
                .into_iter()
                .map(u32::from)
                .collect(),
            categories,
            rules: BTreeMap::new(),
            session: SessionConfig::default(),
            output: OutputConfig::default(),
            reward: RewardConfig::default(),
        }
    }
}

fn address(value: u32) -> Result<Address> {
    if value as usize >= ADDRESS_SPACE_BYTES {
        return Err(Error::RangeOutOfBounds {
            start: value,
            end: value,
        });
    }
    Ok(value as Address)
}

impl WatchConfig {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load `path` if given and present, the built-in layout otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => match Self::load(path) {
                Err(e) if e.is_not_found() => {
                    warn!(
                        "Config file {} not found, using built-in layout",
                        path.display()
                    );
                    Ok(Self::default())
                }
                other => other,
            },
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build every runtime type once and discard the results
    pub fn validate(&self) -> Result<()> {
        self.ranges()?;
        self.policy()?;
        if self.ranges.is_empty() {
            return Err(Error::Config("no ranges configured".to_string()));
        }
        Ok(())
    }

    pub fn ranges(&self) -> Result<Vec<AddressRange>> {
        self.ranges
            .iter()
            .map(|entry| match &entry.label {
                Some(label) => AddressRange::labeled(entry.start, entry.end, label),
                None => AddressRange::new(entry.start, entry.end),
            })
            .collect()
    }

    pub fn ignore_set(&self) -> Result<IgnoreSet> {
        self.ignore.iter().map(|value| address(*value)).collect()
    }

    pub fn category_table(&self) -> Result<CategoryTable> {
        let mut table = CategoryTable::new();
        for entry in &self.categories {
            table.push(AddressRange::new(entry.start, entry.end)?, entry.category);
        }
        Ok(table)
    }

    pub fn policy(&self) -> Result<ClassificationPolicy> {
        let mut policy = ClassificationPolicy::new(self.ignore_set()?, self.category_table()?);
        for (name, rule) in &self.rules {
            let category = Category::from_str(name)
                .map_err(|_| Error::Config(format!("unknown category in rules: {}", name)))?;
            policy = policy.with_rule(category, *rule);
        }
        Ok(policy)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerMode;
    use crate::snapshot::Delta;

    #[test]
    fn test_default_is_valid() {
        let config = WatchConfig::default();
        config.validate().unwrap();

        let ranges = config.ranges().unwrap();
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges[3].label(), Some("Work RAM High"));

        let ignore = config.ignore_set().unwrap();
        assert!(ignore.contains(link::SUBPIXEL_X));
        assert!(ignore.contains(0xFF98));
        assert!(!ignore.contains(link::POSITION_X));
    }

    #[test]
    fn test_default_table() {
        let table = WatchConfig::default().category_table().unwrap();
        assert_eq!(table.lookup(link::POSITION_X), Category::Position);
        assert_eq!(table.lookup(0xDB02), Category::ItemFlag);
        // Health is listed after the flag region, so it wins
        assert_eq!(table.lookup(stats::HEALTH), Category::Health);
        assert_eq!(table.lookup(0xD000), Category::Uncategorized);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = WatchConfig::parse(
            r#"
            ignore = [0xC00C]

            [[ranges]]
            start = 0xDB00
            end = 0xDBFF
            label = "Flags"

            [[categories]]
            start = 0xDBAE
            end = 0xDBAE
            category = "map_transition"

            [rules]
            item_flag = "any_change"

            [session]
            settle_frames = 60
            ledger_mode = "per_transition"
            "#,
        )
        .unwrap();

        assert_eq!(config.ranges().unwrap()[0].label(), Some("Flags"));
        assert_eq!(config.session.settle_frames, 60);
        assert_eq!(config.session.poll_frames, 30);
        assert_eq!(config.session.ledger_mode, LedgerMode::PerTransition);
        assert_eq!(config.reward, RewardConfig::default());

        let policy = config.policy().unwrap();
        assert_eq!(policy.rule_for(Category::ItemFlag), DiscoveryRule::AnyChange);
        let delta = Delta::new(0xDBAE, 0x10, 0x11);
        assert_eq!(policy.classify(&delta).category(), Some(Category::MapTransition));
    }

    #[test]
    fn test_rejects_bad_addresses() {
        let err = WatchConfig::parse("ignore = [0x10000]").unwrap_err();
        assert!(matches!(err, Error::RangeOutOfBounds { start: 0x10000, .. }));

        let err = WatchConfig::parse(
            r#"
            [[ranges]]
            start = 0xDBFF
            end = 0xDB00
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRange { .. }));
    }

    #[test]
    fn test_rejects_unknown_rule_category() {
        let err = WatchConfig::parse(
            r#"
            [rules]
            treasure = "never"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_empty_ranges() {
        let err = WatchConfig::parse("ranges = []").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_to_toml_reparses() {
        let config = WatchConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(WatchConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = WatchConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, WatchConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramwatch.toml");
        fs::write(&path, "[output]\nper_range_limit = 3\n").unwrap();

        let config = WatchConfig::load(&path).unwrap();
        assert_eq!(config.output.per_range_limit, 3);
        assert_eq!(config.output.state_dir, PathBuf::from("discovery_states"));
    }
}
