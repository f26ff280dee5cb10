//! Fixed-capacity slot table.
//!
//! This module provides the associative structure behind the LSU's
//! pending-load tracking. It provides:
//! 1. **Bounded allocation:** Capacity fixed at construction; `allocate`
//!    returns the lowest free index.
//! 2. **Stable tags:** An index returned by `allocate` stays valid until
//!    `release`, so it can travel through the memory subsystem as a tag.

/// A fixed-capacity table of slots addressed by small integer index.
///
/// Allocation scans for the lowest unoccupied slot, matching the hardware's
/// first-free-entry allocator. `size() <= capacity()` holds at every cycle.
pub struct SlotTable<T> {
    entries: Vec<Option<T>>,
    size: usize,
}

impl<T> SlotTable<T> {
    /// Creates a table with the given capacity, all slots free.
    pub fn new(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self { entries, size: 0 }
    }

    /// Returns whether no slot is occupied.
    pub fn empty(&self) -> bool {
        self.size == 0
    }

    /// Returns whether every slot is occupied.
    pub fn full(&self) -> bool {
        self.size == self.entries.len()
    }

    /// Returns the number of occupied slots.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the given index holds a live entry.
    pub fn contains(&self, index: usize) -> bool {
        index < self.entries.len() && self.entries[index].is_some()
    }

    /// Returns a reference to the entry at `index`, if occupied.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).and_then(|e| e.as_ref())
    }

    /// Returns a mutable reference to the entry at `index`, if occupied.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).and_then(|e| e.as_mut())
    }

    /// Stores `value` in the lowest free slot and returns its index.
    ///
    /// Returns `None` when the table is full; callers apply backpressure
    /// rather than dropping the request.
    pub fn allocate(&mut self, value: T) -> Option<usize> {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.is_none() {
                *entry = Some(value);
                self.size += 1;
                return Some(i);
            }
        }
        None
    }

    /// Frees the slot at `index` and returns its entry.
    ///
    /// # Panics
    ///
    /// Panics if the slot is not occupied — releasing a free slot is a
    /// protocol violation upstream.
    pub fn release(&mut self, index: usize) -> T {
        let entry = self.entries[index].take();
        self.size -= 1;
        entry.expect("released an unoccupied slot")
    }

    /// Frees every slot.
    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.size = 0;
    }
}
