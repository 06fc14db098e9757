//! Memory layout constants for Link's Awakening DX (Rev 2, CGB)
//!
//! This module centralizes the addresses and timings the default
//! configuration is built from. Constants are organized by concern.

use super::Address;

/// Regions scanned by default, as `(start, end, label)`
pub mod regions {
    pub const ZERO_PAGE: (u32, u32, &str) = (0x0000, 0x00FF, "Zero Page");
    pub const WORK_RAM_LOW: (u32, u32, &str) = (0xC000, 0xC0FF, "Work RAM Low");
    pub const WORK_RAM_MID: (u32, u32, &str) = (0xD000, 0xD0FF, "Work RAM Mid");
    pub const WORK_RAM_HIGH: (u32, u32, &str) = (0xDB00, 0xDBFF, "Work RAM High");
    pub const HIGH_RAM: (u32, u32, &str) = (0xFF80, 0xFFFE, "High RAM");

    pub const ALL: [(u32, u32, &str); 5] =
        [ZERO_PAGE, WORK_RAM_LOW, WORK_RAM_MID, WORK_RAM_HIGH, HIGH_RAM];
}

/// Player position
pub mod link {
    use super::Address;

    pub const POSITION_X: Address = 0xC008;
    pub const POSITION_Y: Address = 0xC009;

    /// Sub-pixel offsets, churn every movement frame
    pub const SUBPIXEL_X: Address = 0xC00C;
    pub const SUBPIXEL_Y: Address = 0xC00D;

    /// High RAM position mirrors
    pub const HRAM_MIRRORS: [Address; 4] = [0xFF98, 0xFF99, 0xFF9F, 0xFFA0];
}

/// Item / event flag region (values are 0 or 1)
pub mod flags {
    pub const START: u32 = 0xDB00;
    pub const END: u32 = 0xDBFF;
}

/// Player stats living inside the flag region
pub mod stats {
    use super::Address;

    /// Current health in eighths of a heart
    pub const HEALTH: Address = 0xDB5A;
    pub const SHIELD_LEVEL: Address = 0xDB44;
}

/// Timing constants, in frames unless noted
pub mod timing {
    /// Frames between flag checks in the live monitor (half a second)
    pub const FLAG_POLL_INTERVAL_FRAMES: u32 = 30;

    /// Frames to let dialogue and screen transitions finish after an action
    pub const ACTION_SETTLE_FRAMES: u32 = 120;

    /// Frames advanced after releasing the button in one environment step
    pub const ENV_SETTLE_FRAMES: u32 = 4;

    /// Interval between polls of a RAM dump file (ms)
    pub const DUMP_POLL_INTERVAL_MS: u64 = 500;
}

/// Addresses ignored by default: sub-pixel offsets and the HRAM mirrors.
pub fn default_ignored() -> Vec<Address> {
    let mut ignored = vec![link::SUBPIXEL_X, link::SUBPIXEL_Y];
    ignored.extend_from_slice(&link::HRAM_MIRRORS);
    ignored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_are_ordered_and_disjoint() {
        for pair in regions::ALL.windows(2) {
            assert!(pair[0].1 < pair[1].0);
        }
    }

    #[test]
    fn test_stats_inside_flag_region() {
        for address in [stats::HEALTH, stats::SHIELD_LEVEL] {
            assert!((flags::START..=flags::END).contains(&(address as u32)));
        }
    }

    #[test]
    fn test_default_ignored_excludes_main_position() {
        let ignored = default_ignored();
        assert!(!ignored.contains(&link::POSITION_X));
        assert!(!ignored.contains(&link::POSITION_Y));
        assert!(ignored.contains(&0xFF98));
    }
}
