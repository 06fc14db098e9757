//! Hexdump command implementation.
//!
//! Displays bytes of a RAM image in traditional hexdump format, labelled
//! with their Game Boy addresses.
//!
//! # Output Format
//!
//! ```text
//! 0xDB00: 00 00 01 00 00 00 00 00  00 00 00 00 00 00 00 00  |................|
//! ```

use std::path::Path;

use anyhow::Result;
use ramwatch_core::{Address, MemoryImage, ReadMemory};

/// Run the hexdump command
pub fn run(image: &Path, address: Address, size: usize, ascii: bool) -> Result<()> {
    let image = MemoryImage::load(image)?;
    let bytes = image.read_bytes(address, size);

    println!("Hexdump at 0x{:04X} ({} bytes):", address, bytes.len());
    println!();
    for line in format_hexdump(address, &bytes, ascii) {
        println!("{}", line);
    }

    Ok(())
}

/// Format `bytes` read from `start` as 16-byte lines
pub fn format_hexdump(start: Address, bytes: &[u8], ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("0x{:04X}: ", start as usize + i * 16);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            if ascii {
                line.push_str(" |");
                for byte in chunk {
                    if (0x20..0x7F).contains(byte) {
                        line.push(*byte as char);
                    } else {
                        line.push('.');
                    }
                }
                for _ in chunk.len()..16 {
                    line.push(' ');
                }
                line.push('|');
            }

            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_line() {
        let bytes: Vec<u8> = (0..16).collect();
        let lines = format_hexdump(0xDB00, &bytes, false);
        assert_eq!(
            lines,
            vec!["0xDB00: 00 01 02 03 04 05 06 07  08 09 0A 0B 0C 0D 0E 0F "]
        );
    }

    #[test]
    fn test_partial_line_with_ascii() {
        let lines = format_hexdump(0xC000, b"Link\x00", true);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("0xC000: 4C 69 6E 6B 00 "));
        assert!(lines[0].ends_with(" |Link.           |"));
    }

    #[test]
    fn test_line_addresses() {
        let lines = format_hexdump(0xFF80, &[0u8; 40], false);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0xFF90: "));
        assert!(lines[2].starts_with("0xFFA0: "));
    }
}
