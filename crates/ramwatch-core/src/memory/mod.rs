//! Memory view abstraction and address ranges.
//!
//! The emulator owns the memory; this crate only ever reads it through
//! [`ReadMemory`]. Addresses are 16-bit, so every `u16` is a valid cell.

mod image;
pub mod layout;
mod range;

pub use image::{ADDRESS_SPACE_BYTES, MemoryImage};
pub use range::AddressRange;

/// One cell of the 16-bit address space.
pub type Address = u16;

/// Read-only, byte-addressable view of emulated memory.
pub trait ReadMemory {
    fn read_byte(&self, address: Address) -> u8;

    /// Read `len` consecutive bytes starting at `address`.
    ///
    /// Stops early at the end of the address space instead of wrapping.
    fn read_bytes(&self, address: Address, len: usize) -> Vec<u8> {
        let available = ADDRESS_SPACE_BYTES - address as usize;
        (0..len.min(available))
            .map(|offset| self.read_byte(address + offset as Address))
            .collect()
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for &T {
    fn read_byte(&self, address: Address) -> u8 {
        (**self).read_byte(address)
    }
}

impl<T: ReadMemory + ?Sized> ReadMemory for &mut T {
    fn read_byte(&self, address: Address) -> u8 {
        (**self).read_byte(address)
    }
}

/// Format an address as `0xABCD`.
pub fn format_address(address: Address) -> String {
    format!("0x{:04X}", address)
}
