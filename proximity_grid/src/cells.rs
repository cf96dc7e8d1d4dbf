// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse cell storage.
//!
//! Only cells holding at least one handle are materialized, so memory scales
//! with the number of occupied cells rather than with world area.

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::coord::CellCoord;

#[derive(Clone)]
struct Cell<H> {
    handles: SmallVec<[H; 8]>,
}

impl<H> Default for Cell<H> {
    fn default() -> Self {
        Self {
            handles: SmallVec::new(),
        }
    }
}

/// Sparse map from cell coordinate to the handles overlapping that cell.
///
/// Handles within a cell have no particular order.
#[derive(Clone)]
pub struct CellMap<H> {
    cells: HashMap<CellCoord, Cell<H>>,
    entries: usize,
}

impl<H> Default for CellMap<H> {
    fn default() -> Self {
        Self {
            cells: HashMap::new(),
            entries: 0,
        }
    }
}

impl<H> Debug for CellMap<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CellMap")
            .field("active_cells", &self.cells.len())
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl<H: Copy + Eq + Hash> CellMap<H> {
    /// Handles in the cell at `coord`; empty for cells that were never populated.
    #[inline]
    pub fn cell_at(&self, coord: CellCoord) -> &[H] {
        self.cells
            .get(&coord)
            .map_or(&[][..], |cell| cell.handles.as_slice())
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn active_cells(&self) -> usize {
        self.cells.len()
    }

    /// Total handle entries across all cells.
    ///
    /// An object spanning four cells contributes four entries.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Largest number of handles held by a single cell.
    pub fn max_occupancy(&self) -> usize {
        self.cells
            .values()
            .map(|cell| cell.handles.len())
            .max()
            .unwrap_or(0)
    }

    /// Iterate populated cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &[H])> + '_ {
        self.cells
            .iter()
            .map(|(&coord, cell)| (coord, cell.handles.as_slice()))
    }

    pub(crate) fn add_to_cell(&mut self, coord: CellCoord, handle: H) {
        let cell = self.cells.entry(coord).or_default();
        debug_assert!(
            !cell.handles.contains(&handle),
            "grid invariant violated: handle added twice to one cell"
        );
        cell.handles.push(handle);
        self.entries += 1;
    }

    /// Remove `handle` from the cell at `coord`, dropping the cell once it is empty.
    ///
    /// Returns whether the handle was present.
    pub(crate) fn remove_from_cell(&mut self, coord: CellCoord, handle: H) -> bool {
        let Some(cell) = self.cells.get_mut(&coord) else {
            return false;
        };
        let Some(pos) = cell.handles.iter().position(|&h| h == handle) else {
            return false;
        };
        cell.handles.swap_remove(pos);
        self.entries -= 1;

        if cell.handles.is_empty() {
            self.cells.remove(&coord);
        }
        true
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.cells.reserve(additional);
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
        self.entries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_read_as_empty() {
        let map = CellMap::<u32>::default();
        assert!(map.cell_at(CellCoord::new(3, -7)).is_empty());
        assert_eq!(map.active_cells(), 0);
        assert_eq!(map.max_occupancy(), 0);
    }

    #[test]
    fn emptied_cells_are_dropped() {
        let mut map = CellMap::<u32>::default();
        let c = CellCoord::new(1, 1);
        map.add_to_cell(c, 7);
        map.add_to_cell(c, 8);
        map.add_to_cell(CellCoord::new(2, 1), 7);
        assert_eq!(map.active_cells(), 2);
        assert_eq!(map.entries(), 3);
        assert_eq!(map.max_occupancy(), 2);

        assert!(map.remove_from_cell(c, 7));
        assert_eq!(map.cell_at(c), &[8]);
        assert!(map.remove_from_cell(c, 8));
        assert_eq!(map.active_cells(), 1);
        assert_eq!(map.entries(), 1);
        assert_eq!(map.iter().count(), 1);
    }

    #[test]
    fn removing_missing_handle_is_reported() {
        let mut map = CellMap::<u32>::default();
        let c = CellCoord::new(0, 0);
        assert!(!map.remove_from_cell(c, 1));
        map.add_to_cell(c, 2);
        assert!(!map.remove_from_cell(c, 1));
        assert_eq!(map.entries(), 1);
    }

    #[test]
    fn clear_drops_everything() {
        let mut map = CellMap::<u32>::default();
        for x in 0..10 {
            map.add_to_cell(CellCoord::new(x, 0), 1);
        }
        map.clear();
        assert_eq!(map.active_cells(), 0);
        assert_eq!(map.entries(), 0);
    }
}
