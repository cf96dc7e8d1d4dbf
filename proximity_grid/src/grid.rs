// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform hash grid over 2D AABBs.
//!
//! The grid buckets each tracked object into every fixed-size cell its
//! bounding box overlaps and answers queries by touching only the cells
//! overlapping the query primitive. It is intended for workloads with:
//! - moderately uniform spatial density,
//! - mostly static objects with occasional moves, and
//! - query regions that are small compared to the full world extent.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace};

use crate::cells::CellMap;
use crate::config::GridConfig;
use crate::coord::{CellCoord, CellMapper, CellRange, GridScalar};
use crate::error::{GridError, GridResult};
use crate::types::Aabb2D;

/// What [`HashGrid::insert`] did with the handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The handle was not tracked before.
    Inserted,
    /// The handle was already tracked; its old footprint was removed first.
    Replaced,
}

/// Work done by a single query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryCost {
    /// Cells inspected.
    ///
    /// This is the number of cells under the query, or the number of active
    /// cells when the query covers more cells than the grid holds. Either way
    /// it never depends on how many objects share those cells.
    pub cells_visited: u64,
    /// Distinct handles reported.
    pub candidates: usize,
}

/// Occupancy summary used to tune the cell size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStats {
    /// Cells holding at least one handle.
    pub active_cells: usize,
    /// Objects currently tracked.
    pub tracked_objects: usize,
    /// Handle entries summed over all cells.
    pub cell_entries: usize,
    /// Most handles held by any one cell.
    pub max_cell_occupancy: usize,
}

impl GridStats {
    /// Average handles per active cell; `0.0` for an empty grid.
    #[allow(
        clippy::cast_precision_loss,
        reason = "Diagnostic ratio; precision loss beyond 2^52 entries is irrelevant."
    )]
    pub fn mean_occupancy(&self) -> f64 {
        if self.active_cells == 0 {
            0.0
        } else {
            self.cell_entries as f64 / self.active_cells as f64
        }
    }
}

#[derive(Clone, Debug)]
struct Footprint<T> {
    aabb: Aabb2D<T>,
    // Cells currently containing the handle.
    range: CellRange,
}

/// Uniform hash grid with a fixed cell size.
///
/// `H` is an opaque, stable handle for an object owned elsewhere. The grid
/// records which cells each handle occupies but never owns or drops the
/// object itself.
///
/// Queries are broad-phase: they return every handle whose indexed footprint
/// shares a cell with the query, which is a superset of the objects that
/// actually intersect it. Callers apply their own exact test.
#[derive(Clone)]
pub struct HashGrid<T: GridScalar, H> {
    mapper: CellMapper<T>,
    cells: CellMap<H>,
    objects: HashMap<H, Footprint<T>>,
}

impl<T: GridScalar, H> Debug for HashGrid<T, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashGrid")
            .field("cell_size", &self.mapper.cell_size())
            .field("origin", &self.mapper.origin())
            .field("tracked_objects", &self.objects.len())
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl<T: GridScalar, H: Copy + Eq + Hash> HashGrid<T, H> {
    /// Create an empty grid with the given cell size and origin at (0, 0).
    pub fn new(cell_size: T) -> GridResult<Self> {
        Self::with_config(GridConfig::with_cell_size(cell_size))
    }

    /// Create an empty grid from a full configuration.
    pub fn with_config(config: GridConfig<T>) -> GridResult<Self> {
        config.validate()?;
        debug!(
            cell_size = ?config.cell_size,
            origin_x = ?config.origin_x,
            origin_y = ?config.origin_y,
            "created hash grid"
        );
        Ok(Self {
            mapper: CellMapper::new(config.cell_size, config.origin_x, config.origin_y),
            cells: CellMap::default(),
            objects: HashMap::new(),
        })
    }

    /// Reserve space for at least `n` more objects.
    pub fn reserve(&mut self, n: usize) {
        self.objects.reserve(n);
        self.cells.reserve(n);
    }

    /// Side length of a cell.
    #[inline]
    pub fn cell_size(&self) -> T {
        self.mapper.cell_size()
    }

    /// World position of the corner of cell `(0, 0)`.
    #[inline]
    pub fn origin(&self) -> (T, T) {
        self.mapper.origin()
    }

    /// The coordinate mapper this grid partitions space with.
    #[inline]
    pub fn mapper(&self) -> &CellMapper<T> {
        &self.mapper
    }

    /// Read-only view of the sparse cell storage.
    #[inline]
    pub fn cells(&self) -> &CellMap<H> {
        &self.cells
    }

    /// Number of tracked objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of non-empty cells.
    #[inline]
    pub fn active_cells(&self) -> usize {
        self.cells.active_cells()
    }

    /// Whether `handle` is tracked.
    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.objects.contains_key(&handle)
    }

    /// The box `handle` was last indexed with.
    pub fn bounds(&self, handle: H) -> Option<Aabb2D<T>> {
        self.objects.get(&handle).map(|fp| fp.aabb)
    }

    /// The cells `handle` currently occupies.
    pub fn footprint(&self, handle: H) -> Option<CellRange> {
        self.objects.get(&handle).map(|fp| fp.range)
    }

    /// Iterate tracked handles with their indexed boxes, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (H, Aabb2D<T>)> + '_ {
        self.objects.iter().map(|(&h, fp)| (h, fp.aabb))
    }

    /// Occupancy summary.
    pub fn stats(&self) -> GridStats {
        GridStats {
            active_cells: self.cells.active_cells(),
            tracked_objects: self.objects.len(),
            cell_entries: self.cells.entries(),
            max_cell_occupancy: self.cells.max_occupancy(),
        }
    }

    /// Start tracking `handle` with bounding box `aabb`.
    ///
    /// Inserting a handle that is already tracked is the same as calling
    /// [`remove`][Self::remove] and then inserting; the result is
    /// [`InsertOutcome::Replaced`]. A handle never appears twice in a cell.
    pub fn insert(&mut self, handle: H, aabb: Aabb2D<T>) -> InsertOutcome {
        let outcome = if self.remove(handle).is_some() {
            debug!("re-inserted tracked handle; previous footprint removed");
            InsertOutcome::Replaced
        } else {
            InsertOutcome::Inserted
        };

        let range = self.mapper.covered_range(&aabb);
        for coord in range.iter() {
            self.cells.add_to_cell(coord, handle);
        }
        self.objects.insert(handle, Footprint { aabb, range });
        outcome
    }

    /// Stop tracking `handle`, returning the box it was indexed with.
    ///
    /// Unknown handles are ignored, so this is safe to call repeatedly.
    pub fn remove(&mut self, handle: H) -> Option<Aabb2D<T>> {
        let fp = self.objects.remove(&handle)?;
        for coord in fp.range.iter() {
            let removed = self.cells.remove_from_cell(coord, handle);
            debug_assert!(removed, "grid invariant violated: handle missing from its cell");
        }
        Some(fp.aabb)
    }

    /// Re-index `handle` with a new bounding box.
    ///
    /// Only cells entering or leaving the footprint are touched; cells in both
    /// the old and new footprint keep their entry. The resulting state is the
    /// same as a fresh insert with `aabb`.
    ///
    /// Returns `false`, doing nothing, if `handle` is not tracked.
    pub fn update(&mut self, handle: H, aabb: Aabb2D<T>) -> bool {
        let new_range = self.mapper.covered_range(&aabb);
        let Some(fp) = self.objects.get_mut(&handle) else {
            return false;
        };
        let old_range = fp.range;
        fp.aabb = aabb;
        fp.range = new_range;
        if old_range == new_range {
            return true;
        }

        if !old_range.intersects(&new_range) {
            for coord in old_range.iter() {
                let removed = self.cells.remove_from_cell(coord, handle);
                debug_assert!(removed, "grid invariant violated: handle missing from its cell");
            }
            for coord in new_range.iter() {
                self.cells.add_to_cell(coord, handle);
            }
            return true;
        }

        for coord in old_range.iter().filter(|&c| !new_range.contains(c)) {
            let removed = self.cells.remove_from_cell(coord, handle);
            debug_assert!(removed, "grid invariant violated: handle missing from its cell");
        }
        for coord in new_range.iter().filter(|&c| !old_range.contains(c)) {
            self.cells.add_to_cell(coord, handle);
        }
        true
    }

    /// Drop every cell and object record.
    pub fn clear(&mut self) {
        trace!(
            objects = self.objects.len(),
            cells = self.cells.active_cells(),
            "clearing hash grid"
        );
        self.cells.clear();
        self.objects.clear();
    }

    /// Raw contents of one cell.
    #[inline]
    pub fn query_cell(&self, coord: CellCoord) -> &[H] {
        self.cells.cell_at(coord)
    }

    /// Raw contents of the cell containing the point `(x, y)`.
    #[inline]
    pub fn query_point(&self, x: T, y: T) -> &[H] {
        self.cells.cell_at(self.mapper.cell_of(x, y))
    }

    /// Handles whose footprint shares a cell with `rect`, each reported once.
    pub fn query_region(&self, rect: Aabb2D<T>) -> Vec<H> {
        let mut out = Vec::new();
        self.visit_region(rect, |h| out.push(h));
        out
    }

    /// Visit handles whose footprint shares a cell with `rect` (does not allocate result storage).
    ///
    /// Each handle is passed to `f` exactly once, in unspecified order.
    ///
    /// A query covering more cells than the grid has populated scans the
    /// populated cells instead, so an oversized rectangle costs no more than
    /// a walk over the whole grid.
    pub fn visit_region<F: FnMut(H)>(&self, rect: Aabb2D<T>, mut f: F) -> QueryCost {
        let range = self.mapper.covered_range(&rect);
        let mut cost = QueryCost::default();

        if range.len() == 1 {
            // A handle appears at most once per cell, so there is nothing to dedup.
            let handles = self.cells.cell_at(range.min());
            handles.iter().copied().for_each(&mut f);
            cost.cells_visited = 1;
            cost.candidates = handles.len();
            return cost;
        }

        let mut seen: HashSet<H> = HashSet::new();
        let mut report = |handles: &[H], cost: &mut QueryCost| {
            for &handle in handles {
                if seen.insert(handle) {
                    cost.candidates += 1;
                    f(handle);
                }
            }
        };

        if range.len() > self.cells.active_cells() as u64 {
            for (coord, handles) in self.cells.iter() {
                cost.cells_visited += 1;
                if range.contains(coord) {
                    report(handles, &mut cost);
                }
            }
        } else {
            for coord in range.iter() {
                cost.cells_visited += 1;
                report(self.cells.cell_at(coord), &mut cost);
            }
        }
        cost
    }

    /// Handles near the circle at `(cx, cy)` with `radius`.
    ///
    /// This is [`query_region`][Self::query_region] over the circle's
    /// enclosing square; no distance test is applied.
    pub fn query_circle(&self, cx: T, cy: T, radius: T) -> Vec<H> {
        self.query_region(Aabb2D::around(cx, cy, radius))
    }

    /// Visit handles near the circle at `(cx, cy)` with `radius`.
    pub fn visit_circle<F: FnMut(H)>(&self, cx: T, cy: T, radius: T, f: F) -> QueryCost {
        self.visit_region(Aabb2D::around(cx, cy, radius), f)
    }

    /// Verify that object records and cells agree.
    ///
    /// Every cell in a record's footprint must hold the handle exactly once,
    /// and no other cell may hold it. This walks the whole grid.
    pub fn check_invariants(&self) -> GridResult<()> {
        let mut expected_entries: usize = 0;
        for (&handle, fp) in &self.objects {
            if fp.range != self.mapper.covered_range(&fp.aabb) {
                return Err(GridError::InvariantViolated(
                    "recorded footprint does not match the indexed box",
                ));
            }
            for coord in fp.range.iter() {
                let count = self
                    .cells
                    .cell_at(coord)
                    .iter()
                    .filter(|&&h| h == handle)
                    .count();
                if count != 1 {
                    return Err(GridError::InvariantViolated(
                        "footprint cell does not hold the handle exactly once",
                    ));
                }
                expected_entries += 1;
            }
        }

        for (coord, handles) in self.cells.iter() {
            if handles.is_empty() {
                return Err(GridError::InvariantViolated("empty cell left in the map"));
            }
            for handle in handles {
                match self.objects.get(handle) {
                    Some(fp) if fp.range.contains(coord) => {}
                    Some(_) => {
                        return Err(GridError::InvariantViolated(
                            "cell holds a handle outside its footprint",
                        ));
                    }
                    None => {
                        return Err(GridError::InvariantViolated(
                            "cell holds an untracked handle",
                        ));
                    }
                }
            }
        }

        if expected_entries != self.cells.entries() {
            return Err(GridError::InvariantViolated("cell entry count is stale"));
        }
        Ok(())
    }
}

/// Hash grid over `f32` coordinates.
pub type HashGridF32<H> = HashGrid<f32, H>;
/// Hash grid over `f64` coordinates.
pub type HashGridF64<H> = HashGrid<f64, H>;
/// Hash grid over `i64` coordinates.
pub type HashGridI64<H> = HashGrid<i64, H>;
