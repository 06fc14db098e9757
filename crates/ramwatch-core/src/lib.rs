//! # ramwatch-core
//!
//! Core library for observing the memory of an emulated Game Boy and
//! detecting discoveries from one action to the next.
//!
//! This crate provides:
//! - Snapshots of configured address ranges and byte-wise diffs
//! - Classification of deltas (ignore set, category table, discovery rules)
//! - An at-most-once discovery ledger
//! - An observation session that drives the emulator through
//!   baseline / action / collect cycles
//! - Event sinks: console reporting, save-state persistence and reward
//!   accumulation
//! - Change reports and a reinforcement-learning stepper
//!
//! The emulator itself is a collaborator behind the [`Emulator`] trait.

pub mod classify;
pub mod config;
pub mod emulator;
pub mod env;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod report;
pub mod session;
pub mod sink;
pub mod snapshot;

pub use classify::{
    Category, CategoryTable, Classification, ClassificationPolicy, DiscoveryRule, IgnoreSet,
    Magnitude,
};
pub use config::WatchConfig;
pub use emulator::{Button, Emulator, FrameDriver};
pub use env::{RewardEnv, StepOutcome};
pub use error::{AlreadyDiscovered, Error, Result};
pub use ledger::{DiscoveryLedger, DiscoveryRecord, LedgerMode};
pub use memory::{Address, AddressRange, MemoryImage, ReadMemory, format_address};
pub use report::{ChangeReport, FrequencyAnalysis};
pub use session::{ObservationSession, SessionConfig, SessionState};
pub use sink::{
    ConsoleReporter, DiscoveryEvent, EventSink, RewardAccumulator, RewardConfig,
    StateSnapshotPersister,
};
pub use snapshot::{Delta, Snapshot, SnapshotKind, diff};
