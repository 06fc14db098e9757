use serde::{Deserialize, Serialize};

use crate::ledger::LedgerMode;
use crate::memory::layout::timing;

/// Configuration for an observation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Frames advanced after an action before the post-action snapshot
    pub settle_frames: u32,
    /// Frames between polls in monitoring mode
    pub poll_frames: u32,
    /// How the discovery ledger keys its records
    pub ledger_mode: LedgerMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_frames: timing::ACTION_SETTLE_FRAMES,
            poll_frames: timing::FLAG_POLL_INTERVAL_FRAMES,
            ledger_mode: LedgerMode::PerAddress,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

/// Builder for SessionConfig
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    settle_frames: Option<u32>,
    poll_frames: Option<u32>,
    ledger_mode: Option<LedgerMode>,
}

impl SessionConfigBuilder {
    pub fn settle_frames(mut self, frames: u32) -> Self {
        self.settle_frames = Some(frames);
        self
    }

    pub fn poll_frames(mut self, frames: u32) -> Self {
        self.poll_frames = Some(frames);
        self
    }

    pub fn ledger_mode(mut self, mode: LedgerMode) -> Self {
        self.ledger_mode = Some(mode);
        self
    }

    /// Build the configuration
    pub fn build(self) -> SessionConfig {
        let default = SessionConfig::default();
        SessionConfig {
            settle_frames: self.settle_frames.unwrap_or(default.settle_frames),
            poll_frames: self.poll_frames.unwrap_or(default.poll_frames),
            ledger_mode: self.ledger_mode.unwrap_or(default.ledger_mode),
        }
    }
}
