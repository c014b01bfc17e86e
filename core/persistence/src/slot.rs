//! FILENAME: core/persistence/src/slot.rs
//! PURPOSE: The numbered view slots a user can save into.

use crate::error::ViewError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A saved-view slot, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ViewSlot(u8);

impl ViewSlot {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 5;

    pub fn new(slot: u32) -> Result<Self, ViewError> {
        if (Self::FIRST as u32..=Self::LAST as u32).contains(&slot) {
            Ok(ViewSlot(slot as u8))
        } else {
            Err(ViewError::InvalidSlot(slot))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every slot, in order.
    pub fn all() -> impl Iterator<Item = ViewSlot> {
        (Self::FIRST..=Self::LAST).map(ViewSlot)
    }

    /// Name given to a view saved without one.
    pub fn default_name(self) -> String {
        format!("View {}", self.0)
    }
}

impl TryFrom<u32> for ViewSlot {
    type Error = ViewError;

    fn try_from(slot: u32) -> Result<Self, Self::Error> {
        ViewSlot::new(slot)
    }
}

impl From<ViewSlot> for u32 {
    fn from(slot: ViewSlot) -> u32 {
        slot.0 as u32
    }
}

impl fmt::Display for ViewSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_range() {
        assert!(ViewSlot::new(0).is_err());
        assert_eq!(ViewSlot::new(3).map(ViewSlot::get).ok(), Some(3));
        assert!(matches!(ViewSlot::new(6), Err(ViewError::InvalidSlot(6))));
        assert_eq!(ViewSlot::all().count(), 5);
    }

    #[test]
    fn test_slot_serde() {
        let slot: ViewSlot = serde_json::from_str("2").unwrap();
        assert_eq!(slot.get(), 2);
        assert_eq!(serde_json::to_string(&slot).unwrap(), "2");
        assert!(serde_json::from_str::<ViewSlot>("9").is_err());
    }
}
