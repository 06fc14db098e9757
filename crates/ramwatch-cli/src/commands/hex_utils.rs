//! Hex address parsing.

use anyhow::{Result, bail};
use ramwatch_core::Address;

/// Parse a 16-bit hex address (with or without 0x prefix).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(parse_hex_address("0xDB00").unwrap(), 0xDB00);
/// assert_eq!(parse_hex_address("db00").unwrap(), 0xDB00);
/// ```
pub fn parse_hex_address(s: &str) -> Result<Address> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    let value = u32::from_str_radix(digits, 16)
        .map_err(|e| anyhow::anyhow!("Invalid hex address: {}", e))?;
    if value > u32::from(Address::MAX) {
        bail!("Address {} is outside the 16-bit address space", s);
    }
    Ok(value as Address)
}
