// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational object table paired with a [`HashGrid`].
//!
//! [`SpatialWorld`] owns per-object payloads in a slot arena and indexes each
//! slot's bounding box in a grid keyed by [`Key`]. Removal is eager: removing
//! a key drops its grid entry immediately, so every key a query returns is
//! live. Freed slots are reused with a bumped generation, and keys from an
//! earlier generation are rejected in O(1).

use alloc::vec::Vec;

use crate::config::GridConfig;
use crate::coord::GridScalar;
use crate::error::GridResult;
use crate::grid::{HashGrid, QueryCost};
use crate::types::Aabb2D;

/// Generational handle for world objects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Checked against u32::MAX just above."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        assert!(idx <= u32::MAX as usize, "SpatialWorld slot count exceeds u32::MAX");
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this key was issued for.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

#[derive(Clone, Debug)]
struct Slot<P> {
    generation: u32,
    payload: Option<P>,
}

/// Payload arena with a spatial index over each entry's bounding box.
#[derive(Clone, Debug)]
pub struct SpatialWorld<T: GridScalar, P> {
    slots: Vec<Slot<P>>,
    free_list: Vec<usize>,
    grid: HashGrid<T, Key>,
}

impl<T: GridScalar, P> SpatialWorld<T, P> {
    /// Create an empty world indexed with the given grid configuration.
    pub fn new(config: GridConfig<T>) -> GridResult<Self> {
        Ok(Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            grid: HashGrid::with_config(config)?,
        })
    }

    /// Create an empty world with `cell_size` cells anchored at the origin.
    pub fn with_cell_size(cell_size: T) -> GridResult<Self> {
        Self::new(GridConfig::with_cell_size(cell_size))
    }

    /// The underlying spatial index.
    #[inline]
    pub fn grid(&self) -> &HashGrid<T, Key> {
        &self.grid
    }

    /// Number of live objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Whether there are no live objects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Add an object and index it under `aabb`. Returns a stable handle `Key`.
    ///
    /// # Panics
    ///
    /// Panics if the world would need more than `u32::MAX + 1` slots.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let key = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            debug_assert!(slot.payload.is_none(), "free list holds a live slot");
            slot.payload = Some(payload);
            Key::new(idx, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 0,
                payload: Some(payload),
            });
            Key::new(self.slots.len() - 1, 0)
        };
        self.grid.insert(key, aabb);
        key
    }

    /// Whether `key` refers to a live object.
    #[inline]
    pub fn is_live(&self, key: Key) -> bool {
        self.slot(key).is_some()
    }

    /// Payload for `key`, or `None` if the key is stale.
    pub fn get(&self, key: Key) -> Option<&P> {
        self.slot(key)?.payload.as_ref()
    }

    /// Mutable payload for `key`, or `None` if the key is stale.
    pub fn get_mut(&mut self, key: Key) -> Option<&mut P> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.payload.as_mut()
    }

    /// Indexed bounding box for `key`.
    pub fn bounds(&self, key: Key) -> Option<Aabb2D<T>> {
        self.slot(key)?;
        self.grid.bounds(key)
    }

    /// Move a live object. Returns `false` for stale keys.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        self.is_live(key) && self.grid.update(key, aabb)
    }

    /// Remove an object, returning its payload. Stale keys are ignored.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        let slot = self.slots.get_mut(key.idx())?;
        if slot.generation != key.generation() {
            return None;
        }
        let payload = slot.payload.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(key.idx());
        self.grid.remove(key);
        Some(payload)
    }

    /// Remove every object. Keys issued before the call become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.payload.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free_list.push(idx);
        }
        self.grid.clear();
    }

    /// Iterate live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &P)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.payload
                .as_ref()
                .map(|payload| (Key::new(idx, slot.generation), payload))
        })
    }

    /// Objects whose footprint shares a cell with `rect`.
    pub fn query_region(&self, rect: Aabb2D<T>) -> Vec<(Key, &P)> {
        let mut out = Vec::new();
        self.visit_region(rect, |k, p| out.push((k, p)));
        out
    }

    /// Visit objects whose footprint shares a cell with `rect` (does not allocate result storage).
    pub fn visit_region<'a, F: FnMut(Key, &'a P)>(&'a self, rect: Aabb2D<T>, mut f: F) -> QueryCost {
        self.grid.visit_region(rect, |key| {
            if let Some(payload) = self.get(key) {
                f(key, payload);
            }
        })
    }

    /// Objects near the circle at `(cx, cy)` with `radius`; broad-phase only.
    pub fn query_circle(&self, cx: T, cy: T, radius: T) -> Vec<(Key, &P)> {
        self.query_region(Aabb2D::around(cx, cy, radius))
    }

    fn slot(&self, key: Key) -> Option<&Slot<P>> {
        let slot = self.slots.get(key.idx())?;
        (slot.generation == key.generation() && slot.payload.is_some()).then_some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Kind {
        Tree,
        Rock,
    }

    fn world() -> SpatialWorld<f32, Kind> {
        SpatialWorld::with_cell_size(64.0).unwrap()
    }

    #[test]
    fn insert_get_and_query() {
        let mut w = world();
        let tree = w.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), Kind::Tree);
        let rock = w.insert(Aabb2D::new(300.0, 300.0, 310.0, 310.0), Kind::Rock);
        assert_eq!(w.len(), 2);
        assert_eq!(w.get(tree), Some(&Kind::Tree));
        assert_eq!(w.bounds(rock), Some(Aabb2D::new(300.0, 300.0, 310.0, 310.0)));

        let hits = w.query_circle(5.0, 5.0, 20.0);
        assert_eq!(hits, [(tree, &Kind::Tree)]);
    }

    #[test]
    fn stale_keys_are_rejected_after_slot_reuse() {
        let mut w = world();
        let a = w.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), Kind::Tree);
        assert_eq!(w.remove(a), Some(Kind::Tree));
        assert!(!w.is_live(a));
        assert_eq!(w.remove(a), None);

        let b = w.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), Kind::Rock);
        assert_ne!(a, b);
        assert_eq!(b.generation(), a.generation() + 1);
        assert_eq!(w.get(a), None);
        assert!(!w.update(a, Aabb2D::new(100.0, 100.0, 110.0, 110.0)));
        assert_eq!(w.remove(a), None);
        assert_eq!(w.get(b), Some(&Kind::Rock));
        assert_eq!(w.grid().query_point(5.0, 5.0), &[b]);
        w.grid().check_invariants().unwrap();
    }

    #[test]
    fn removal_is_eager() {
        let mut w = world();
        let a = w.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), Kind::Tree);
        w.remove(a);
        assert!(w.query_region(Aabb2D::new(0.0, 0.0, 64.0, 64.0)).is_empty());
        assert_eq!(w.grid().active_cells(), 0);
    }

    #[test]
    fn update_moves_and_payload_is_mutable() {
        let mut w = world();
        let a = w.insert(Aabb2D::new(0.0, 0.0, 10.0, 10.0), Kind::Tree);
        assert!(w.update(a, Aabb2D::new(500.0, 500.0, 510.0, 510.0)));
        *w.get_mut(a).unwrap() = Kind::Rock;
        let hits = w.query_region(Aabb2D::new(505.0, 505.0, 506.0, 506.0));
        assert_eq!(hits, [(a, &Kind::Rock)]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    #[should_panic(expected = "slot count exceeds u32::MAX")]
    fn keys_refuse_to_alias_past_u32_slots() {
        let _ = Key::new(u32::MAX as usize + 1, 0);
    }

    #[test]
    fn largest_slot_index_round_trips() {
        let key = Key::new(u32::MAX as usize, 7);
        assert_eq!(key.idx(), u32::MAX as usize);
        assert_eq!(key.generation(), 7);
    }

    #[test]
    fn clear_invalidates_every_key() {
        let mut w = world();
        let keys: Vec<_> = (0..4)
            .map(|i| {
                let x = i as f32 * 100.0;
                w.insert(Aabb2D::new(x, x, x + 5.0, x + 5.0), Kind::Tree)
            })
            .collect();
        w.clear();
        assert!(w.is_empty());
        assert!(keys.iter().all(|&k| !w.is_live(k)));
        assert_eq!(w.iter().count(), 0);

        // Slots are reused lowest-first after a clear.
        let k = w.insert(Aabb2D::new(0.0, 0.0, 1.0, 1.0), Kind::Rock);
        assert_eq!(k.idx(), 0);
        assert_ne!(k, keys[0]);
        assert_eq!(w.iter().collect::<Vec<_>>(), [(k, &Kind::Rock)]);
    }
}
