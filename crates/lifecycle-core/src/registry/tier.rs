//! Tier: one priority's components, in logical order.

use crate::domain::RegistryError;

/// Components sharing one priority value.
///
/// Design:
/// - `storage` is append-only. An entry never moves once written, so a slot
///   number identifies a component for the lifetime of the tier.
/// - `logical_order[i]` is the storage slot of the i-th visible component.
///   Inserting in the middle splices a slot number here instead of shifting
///   `storage`.
/// - Invariant: `logical_order.len() <= storage.len()`, and every entry of
///   `logical_order` is a valid, distinct slot.
#[derive(Debug, Clone)]
pub struct Tier<C> {
    storage: Vec<C>,
    logical_order: Vec<usize>,
}

impl<C> Tier<C> {
    /// Empty tier.
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            logical_order: Vec::new(),
        }
    }

    /// Add to the end of the logical order.
    pub fn append(&mut self, component: C) {
        let slot = self.push_storage(component);
        self.logical_order.push(slot);
    }

    /// Insert at logical position `index` (`0..=visible_count`).
    ///
    /// Inserting at `visible_count` is the same as `append`.
    pub fn insert(&mut self, index: usize, component: C) -> Result<(), RegistryError> {
        let len = self.visible_count();
        if index > len {
            return Err(RegistryError::OutOfRange { index, len });
        }
        let slot = self.push_storage(component);
        self.logical_order.insert(index, slot);
        Ok(())
    }

    /// Number of components in logical order.
    pub fn visible_count(&self) -> usize {
        self.logical_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logical_order.is_empty()
    }

    /// Component at logical position `index`.
    pub fn at(&self, index: usize) -> Result<&C, RegistryError> {
        let slot = self.slot_at(index)?;
        Ok(&self.storage[slot])
    }

    /// Storage slot backing logical position `index`.
    pub fn slot_at(&self, index: usize) -> Result<usize, RegistryError> {
        self.logical_order
            .get(index)
            .copied()
            .ok_or(RegistryError::OutOfRange {
                index,
                len: self.visible_count(),
            })
    }

    /// Storage slot and component at logical position `index`.
    pub(crate) fn entry(&self, index: usize) -> Option<(usize, &C)> {
        let slot = *self.logical_order.get(index)?;
        Some((slot, &self.storage[slot]))
    }

    /// Current logical position of a storage slot, if it is visible.
    pub fn position_of_slot(&self, slot: usize) -> Option<usize> {
        self.logical_order.iter().position(|&s| s == slot)
    }

    /// Components in logical order.
    pub fn iter(&self) -> impl Iterator<Item = &C> {
        self.logical_order.iter().map(|&slot| &self.storage[slot])
    }

    fn push_storage(&mut self, component: C) -> usize {
        let slot = self.storage.len();
        self.storage.push(component);
        slot
    }
}

impl<C> Default for Tier<C> {
    fn default() -> Self {
        Self::new()
    }
}
