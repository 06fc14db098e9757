use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::Serialize;

use super::Address;
use crate::error::{Error, Result};

/// Inclusive `[start, end]` address range with an optional report label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AddressRange {
    start: Address,
    end: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<Arc<str>>,
}

impl AddressRange {
    /// Validate and build a range.
    ///
    /// Values are taken wider than 16 bits so that configuration mistakes
    /// surface as `RangeOutOfBounds` instead of silently truncating.
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > Address::MAX as u32 || end > Address::MAX as u32 {
            return Err(Error::RangeOutOfBounds { start, end });
        }
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }

        Ok(Self {
            start: start as Address,
            end: end as Address,
            label: None,
        })
    }

    pub fn labeled(start: u32, end: u32, label: &str) -> Result<Self> {
        Ok(Self::new(start, end)?.with_label(label))
    }

    /// Single-address range
    pub fn single(address: Address) -> Self {
        Self {
            start: address,
            end: address,
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(Arc::from(label));
        self
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn contains(&self, address: Address) -> bool {
        (self.start..=self.end).contains(&address)
    }

    /// Number of addresses covered (never zero)
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Addresses in ascending order
    pub fn addresses(&self) -> RangeInclusive<Address> {
        self.start..=self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}-0x{:04X}", self.start, self.end)
    }
}
