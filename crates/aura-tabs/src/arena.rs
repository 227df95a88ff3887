//! Realized container slots
//!
//! The visual layer realizes item containers lazily. Each item position owns a
//! slot that is empty until the visual layer reports the element it created.
//! Slots move with their items on insert/remove, so a slot never points at
//! another item's container.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an element in the visual tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContainerArena {
    slots: Vec<Option<ElementId>>,
}

impl ContainerArena {
    pub fn with_len(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Realized container at `index`, if any
    pub fn get(&self, index: usize) -> Option<ElementId> {
        self.slots.get(index).copied().flatten()
    }

    /// Index whose realized container is `element`
    pub fn index_of(&self, element: ElementId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(element))
    }

    /// Number of slots with a realized container
    pub fn realized_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Open an empty slot for a newly inserted item
    pub(crate) fn insert_slot(&mut self, index: usize) {
        self.slots.insert(index, None);
    }

    /// Drop the slot of a removed item, invalidating its container
    pub(crate) fn remove_slot(&mut self, index: usize) -> Option<ElementId> {
        if index < self.slots.len() {
            self.slots.remove(index)
        } else {
            None
        }
    }

    /// Record the container realized for `index`. Returns false when the index
    /// no longer exists.
    pub(crate) fn realize(&mut self, index: usize, element: ElementId) -> bool {
        let Some(slot) = self.slots.get_mut(index) else {
            return false;
        };
        *slot = Some(element);
        true
    }

    pub(crate) fn release(&mut self, index: usize) -> Option<ElementId> {
        self.slots.get_mut(index).and_then(Option::take)
    }
}
