//! Cell storage with stable generational identifiers
//!
//! Neighbour sets hold [`CellId`]s rather than references. Freed slots are
//! reused with a bumped generation, so an id kept past its cell's removal
//! simply stops resolving.

use crate::city::cell::Cell;
use crate::core::types::CellId;

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

/// Registry of every live cell, static and transient
#[derive(Debug, Clone, Default)]
pub struct CellArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl CellArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Store a cell and return its id
    pub fn insert(&mut self, cell: Cell) -> CellId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.cell = Some(cell);
            return CellId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            cell: Some(cell),
        });
        CellId::new(index, 0)
    }

    /// Remove a cell, freeing its slot for reuse
    pub fn remove(&mut self, id: CellId) -> Option<Cell> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let cell = slot.cell.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(cell)
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_ref())
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.cell.as_mut())
    }

    /// Mutable access to two distinct cells at once
    pub fn get_pair_mut(&mut self, a: CellId, b: CellId) -> Option<(&mut Cell, &mut Cell)> {
        if a.index == b.index {
            return None;
        }
        if !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (low, high, swapped) = if a.index < b.index {
            (a.index as usize, b.index as usize, false)
        } else {
            (b.index as usize, a.index as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = head[low].cell.as_mut()?;
        let second = tail[0].cell.as_mut()?;
        if swapped {
            Some((second, first))
        } else {
            Some((first, second))
        }
    }

    pub fn contains(&self, id: CellId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over all live cells
    pub fn iter(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.cell
                .as_ref()
                .map(|cell| (CellId::new(index as u32, slot.generation), cell))
        })
    }

    pub fn ids(&self) -> Vec<CellId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
