use thiserror::Error;

use crate::memory::Address;

/// Ledger rejection for an address (or transition) that was already committed.
///
/// Expected and non-fatal: callers use it to suppress duplicate events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Address {address:#06x} already discovered")]
pub struct AlreadyDiscovered {
    pub address: Address,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Address range {start:#x}-{end:#x} exceeds the 16-bit address space")]
    RangeOutOfBounds { start: u32, end: u32 },

    #[error("Invalid address range: start {start:#06x} is after end {end:#06x}")]
    InvalidRange { start: u32, end: u32 },

    #[error("Emulator driver failure: {0}")]
    DriverFailure(String),

    #[error("Invalid session state: expected {expected}, got {actual}")]
    InvalidSessionState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    AlreadyDiscovered(#[from] AlreadyDiscovered),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if this error came from the emulator collaborator
    pub fn is_driver_failure(&self) -> bool {
        matches!(self, Error::DriverFailure(_))
    }

    pub(crate) fn driver<E: std::fmt::Display>(err: E) -> Self {
        Error::DriverFailure(err.to_string())
    }
}
