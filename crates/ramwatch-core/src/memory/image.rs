use std::fs;
use std::path::Path;

use tracing::debug;

use super::{Address, ReadMemory};
use crate::error::{Error, Result};

/// Number of cells in the 16-bit address space.
pub const ADDRESS_SPACE_BYTES: usize = 0x10000;

/// Flat copy of the whole address space.
///
/// Backs offline comparisons of RAM dumps and the file-polling driver.
#[derive(Clone, PartialEq, Eq)]
pub struct MemoryImage {
    bytes: Vec<u8>,
}

impl MemoryImage {
    /// Create an all-zero image
    pub fn new() -> Self {
        Self {
            bytes: vec![0; ADDRESS_SPACE_BYTES],
        }
    }

    /// Build an image from a raw dump, zero-padding short dumps.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() > ADDRESS_SPACE_BYTES {
            return Err(Error::RangeOutOfBounds {
                start: 0,
                end: (data.len() - 1) as u32,
            });
        }

        let mut bytes = vec![0; ADDRESS_SPACE_BYTES];
        bytes[..data.len()].copy_from_slice(data);
        Ok(Self { bytes })
    }

    /// Load a raw RAM dump from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!("Loaded {} byte memory image from {:?}", data.len(), path);
        Self::from_bytes(&data)
    }

    pub fn write(&mut self, address: Address, value: u8) {
        self.bytes[address as usize] = value;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.bytes.iter().filter(|b| **b != 0).count();
        f.debug_struct("MemoryImage")
            .field("non_zero", &non_zero)
            .finish()
    }
}

impl ReadMemory for MemoryImage {
    fn read_byte(&self, address: Address) -> u8 {
        self.bytes[address as usize]
    }
}
