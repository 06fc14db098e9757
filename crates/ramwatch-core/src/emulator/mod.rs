//! Emulator collaborator contract.
//!
//! The engine depends on exactly five operations beyond reading memory:
//! advancing one frame, capturing and restoring the full machine state,
//! and pressing/releasing a button. Implementations report faults as
//! [`Error::DriverFailure`](crate::Error::DriverFailure).

mod driver;
#[cfg(test)]
pub mod mock;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::memory::ReadMemory;

pub use driver::FrameDriver;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

pub trait Emulator: ReadMemory {
    fn advance_frame(&mut self) -> Result<()>;

    /// Opaque blob; the only contract is round-trip fidelity with
    /// [`restore_full_state`](Self::restore_full_state).
    fn capture_full_state(&mut self) -> Result<Vec<u8>>;

    fn restore_full_state(&mut self, state: &[u8]) -> Result<()>;

    fn press(&mut self, button: Button) -> Result<()>;

    fn release(&mut self, button: Button) -> Result<()>;
}
