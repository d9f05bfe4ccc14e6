//! Shelf contents kept by the shelving bridge, keyed by placement unique id.

use serde::{Deserialize, Serialize};

/// One product sitting in one slot of a shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfItem {
    /// Index into the shelf's product list
    pub product_index: i32,
    /// Slot the product occupies
    pub slot_index: i32,
}

/// Everything stocked on one shelf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfData {
    pub items: Vec<ShelfItem>,
}

impl ShelfData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, product_index: i32, slot_index: i32) -> Self {
        self.items.push(ShelfItem {
            product_index,
            slot_index,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop whatever sits in `slot_index`.
    pub fn clear_slot(&mut self, slot_index: i32) {
        self.items.retain(|item| item.slot_index != slot_index);
    }
}

/// Serialized shelf entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfEntry {
    pub unique_id: String,
    pub data: ShelfData,
}

/// Shelf store contents as written into a save record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfSnapshot {
    pub entries: Vec<ShelfEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_slot() {
        let mut data = ShelfData::new().with_item(0, 0).with_item(1, 1).with_item(2, 1);
        data.clear_slot(1);
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].slot_index, 0);
    }
}
