//! Event sinks: consumers of evaluated deltas.
//!
//! Every sink implements [`EventSink`]; the session dispatches each event
//! of a cycle to every sink it is given, then calls
//! [`EventSink::end_cycle`] once with the post-action snapshot.
//!
//! - [`ConsoleReporter`]: prints discoveries (and optionally every delta)
//! - [`StateSnapshotPersister`]: saves the machine state on each discovery
//! - [`RewardAccumulator`]: turns events into a scalar reward per step

mod console;
mod persister;
mod reward;

use std::sync::Arc;

use serde::Serialize;

use crate::classify::{Category, Classification};
use crate::emulator::Emulator;
use crate::ledger::DiscoveryRecord;
use crate::snapshot::{Delta, Snapshot};

pub use console::ConsoleReporter;
pub use persister::StateSnapshotPersister;
pub use reward::{RewardAccumulator, RewardConfig};

/// One evaluated delta.
///
/// `discovery` is set only when this delta was committed to the ledger;
/// every other delta is informational.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryEvent {
    pub sequence: u64,
    pub frame: u64,
    pub delta: Delta,
    pub classification: Classification,
    pub label: Option<Arc<str>>,
    pub discovery: Option<DiscoveryRecord>,
}

impl DiscoveryEvent {
    pub fn is_discovery(&self) -> bool {
        self.discovery.is_some()
    }

    pub fn category(&self) -> Option<Category> {
        self.classification.category()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

pub trait EventSink {
    /// Consume one event. Sinks never fail the session; problems are
    /// reported through logging.
    fn handle(&mut self, event: &DiscoveryEvent, machine: &mut dyn Emulator);

    /// Called once per evaluated cycle after all of its events
    fn end_cycle(&mut self, _after: &Snapshot) {}
}
