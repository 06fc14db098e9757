use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DiscoveryEvent, EventSink};
use crate::classify::{Category, CategoryTable};
use crate::emulator::Emulator;
use crate::memory::Address;
use crate::memory::layout::{link, stats};
use crate::snapshot::Snapshot;

/// Reward increments and the addresses the multi-address signals read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Per new distinct `(x, y)` pair
    pub position: f64,
    /// Per new map id
    pub map_transition: f64,
    /// Per new `0 -> 1` flag
    pub item_flag: f64,
    /// One-time, when `house_exit_map` is first entered
    pub milestone_house_exit: f64,
    /// One-time, on the first shield level rise
    pub shield_level_increase: f64,
    /// Per unit of health lost (negative)
    pub health_loss: f64,
    /// Per drop of health to zero (negative)
    pub death: f64,

    pub position_x: Option<Address>,
    pub position_y: Option<Address>,
    pub shield_level: Option<Address>,
    pub house_exit_map: Option<u8>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            position: 1.0,
            map_transition: 25.0,
            item_flag: 10.0,
            milestone_house_exit: 50.0,
            shield_level_increase: 15.0,
            health_loss: -0.5,
            death: -50.0,
            position_x: Some(link::POSITION_X),
            position_y: Some(link::POSITION_Y),
            shield_level: Some(stats::SHIELD_LEVEL),
            house_exit_map: None,
        }
    }
}

/// Accumulates a scalar reward from events until drained.
#[derive(Debug, Default)]
pub struct RewardAccumulator {
    config: RewardConfig,
    pending: f64,
    total: f64,
    positions: HashSet<(u8, u8)>,
    maps: HashSet<u8>,
    house_exit_awarded: bool,
    shield_awarded: bool,
}

impl RewardAccumulator {
    pub fn new(config: RewardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    fn add(&mut self, amount: f64, reason: &str) {
        debug!("Reward {:+} ({})", amount, reason);
        self.pending += amount;
        self.total += amount;
    }

    /// Take the reward accumulated since the last drain
    pub fn drain(&mut self) -> f64 {
        std::mem::take(&mut self.pending)
    }

    /// Sum of everything accumulated since construction or reset
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Record the starting position and map ids without rewarding them.
    ///
    /// Map ids are read from every address `table` tags as a map transition.
    pub fn prime(&mut self, start: &Snapshot, table: &CategoryTable) {
        if let Some(position) = self.position_in(start) {
            self.positions.insert(position);
        }
        for (address, value) in start.iter() {
            if table.lookup(address) == Category::MapTransition {
                self.maps.insert(value);
            }
        }
    }

    /// Forget all novelty state and pending reward
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    fn position_in(&self, snapshot: &Snapshot) -> Option<(u8, u8)> {
        let x = snapshot.get(self.config.position_x?)?;
        let y = snapshot.get(self.config.position_y?)?;
        Some((x, y))
    }
}

impl EventSink for RewardAccumulator {
    fn handle(&mut self, event: &DiscoveryEvent, _machine: &mut dyn Emulator) {
        let Some(category) = event.category() else {
            return;
        };
        let delta = event.delta;

        if Some(delta.address()) == self.config.shield_level
            && delta.signed_diff() > 0
            && !self.shield_awarded
        {
            self.shield_awarded = true;
            self.add(self.config.shield_level_increase, "shield level increase");
        }

        match category {
            Category::ItemFlag => {
                if event.is_discovery() && delta.before() == 0 && delta.after() == 1 {
                    self.add(self.config.item_flag, "item flag");
                }
            }
            Category::MapTransition => {
                let map = delta.after();
                if self.maps.insert(map) {
                    self.add(self.config.map_transition, "new map");
                }
                if Some(map) == self.config.house_exit_map && !self.house_exit_awarded {
                    self.house_exit_awarded = true;
                    self.add(self.config.milestone_house_exit, "house exit");
                }
            }
            Category::Health => {
                if delta.signed_diff() < 0 {
                    let lost = delta.magnitude() as f64;
                    self.add(self.config.health_loss * lost, "health lost");
                }
                if delta.before() > 0 && delta.after() == 0 {
                    self.add(self.config.death, "death");
                }
            }
            Category::Position | Category::Uncategorized => {}
        }
    }

    fn end_cycle(&mut self, after: &Snapshot) {
        if let Some(position) = self.position_in(after)
            && self.positions.insert(position)
        {
            self.add(self.config.position, "new position");
        }
    }
}
