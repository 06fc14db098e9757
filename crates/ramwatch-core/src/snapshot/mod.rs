//! Point-in-time captures of memory ranges and the deltas between them.
//!
//! A [`Snapshot`] is a defensive copy: it holds no reference back into the
//! memory view, so the emulator can keep ticking after a capture.

mod diff;

use std::collections::BTreeMap;

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::memory::{Address, AddressRange, ReadMemory};

pub use diff::{Delta, diff};

/// Role a snapshot plays in an observation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SnapshotKind {
    Baseline,
    PreAction,
    PostAction,
}

/// Immutable capture of a set of address ranges at one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    values: BTreeMap<Address, u8>,
    ranges: Vec<AddressRange>,
    frame: u64,
    kind: Option<SnapshotKind>,
}

impl Snapshot {
    /// Read every address of every range once, ascending within each range.
    ///
    /// Addresses shared by overlapping ranges keep the value of their first read.
    pub fn capture<R: ReadMemory + ?Sized>(view: &R, ranges: &[AddressRange], frame: u64) -> Self {
        let mut values = BTreeMap::new();
        for range in ranges {
            for address in range.addresses() {
                values
                    .entry(address)
                    .or_insert_with(|| view.read_byte(address));
            }
        }

        Self {
            values,
            ranges: ranges.to_vec(),
            frame,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: SnapshotKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn get(&self, address: Address) -> Option<u8> {
        self.values.get(&address).copied()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.values.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(address, value)` pairs in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = (Address, u8)> + '_ {
        self.values.iter().map(|(a, v)| (*a, *v))
    }

    pub fn ranges(&self) -> &[AddressRange] {
        &self.ranges
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn kind(&self) -> Option<SnapshotKind> {
        self.kind
    }

    /// Range an address is reported under; the last matching range wins.
    pub fn range_for(&self, address: Address) -> Option<&AddressRange> {
        self.ranges.iter().rev().find(|r| r.contains(address))
    }

    pub fn label_for(&self, address: Address) -> Option<&str> {
        self.range_for(address).and_then(|r| r.label())
    }

    /// Non-zero cells, for debugging queries
    pub fn non_zero(&self) -> Vec<(Address, u8)> {
        self.iter().filter(|(_, v)| *v != 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;

    fn ranges(bounds: &[(u32, u32)]) -> Vec<AddressRange> {
        bounds
            .iter()
            .map(|(s, e)| AddressRange::new(*s, *e).unwrap())
            .collect()
    }

    #[test]
    fn test_capture_reads_only_declared_ranges() {
        let mut image = MemoryImage::new();
        image.write(0xDB02, 1);
        image.write(0xDB06, 9);

        let snapshot = Snapshot::capture(&image, &ranges(&[(0xDB00, 0xDB05)]), 0);

        assert_eq!(snapshot.len(), 6);
        assert_eq!(snapshot.get(0xDB02), Some(1));
        assert_eq!(snapshot.get(0xDB06), None);
        assert!(!snapshot.contains(0xDAFF));
    }

    #[test]
    fn test_capture_is_a_copy() {
        let mut image = MemoryImage::new();
        let snapshot = Snapshot::capture(&image, &ranges(&[(0xC000, 0xC00F)]), 3);

        image.write(0xC008, 0x50);

        assert_eq!(snapshot.get(0xC008), Some(0));
        assert_eq!(snapshot.frame(), 3);
    }

    #[test]
    fn test_overlapping_ranges_count_once() {
        let image = MemoryImage::new();
        let snapshot = Snapshot::capture(&image, &ranges(&[(0x10, 0x1F), (0x18, 0x27)]), 0);
        assert_eq!(snapshot.len(), 0x18);
    }

    #[test]
    fn test_later_range_wins_for_label() {
        let image = MemoryImage::new();
        let declared = vec![
            AddressRange::labeled(0xDB00, 0xDBFF, "Flags").unwrap(),
            AddressRange::labeled(0xDB5A, 0xDB5A, "Health").unwrap(),
        ];
        let snapshot = Snapshot::capture(&image, &declared, 0);

        assert_eq!(snapshot.label_for(0xDB5A), Some("Health"));
        assert_eq!(snapshot.label_for(0xDB59), Some("Flags"));
        assert_eq!(snapshot.label_for(0xC000), None);
    }

    #[test]
    fn test_iter_is_ascending_and_non_zero() {
        let mut image = MemoryImage::new();
        image.write(0x0003, 7);
        image.write(0xFF90, 2);
        let snapshot = Snapshot::capture(&image, &ranges(&[(0xFF80, 0xFF9F), (0x0000, 0x000F)]), 0);

        let addresses: Vec<_> = snapshot.iter().map(|(a, _)| a).collect();
        assert!(addresses.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(snapshot.non_zero(), vec![(0x0003, 7), (0xFF90, 2)]);
    }

    #[test]
    fn test_kind_label() {
        let image = MemoryImage::new();
        let snapshot =
            Snapshot::capture(&image, &ranges(&[(0, 0)]), 0).with_kind(SnapshotKind::PostAction);
        assert_eq!(snapshot.kind(), Some(SnapshotKind::PostAction));
        assert_eq!(SnapshotKind::PostAction.to_string(), "post-action");
    }
}
