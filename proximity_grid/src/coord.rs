// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping from world-space positions and boxes to integer cell coordinates.

use crate::types::{Aabb2D, Scalar};

/// Scalar types usable as grid coordinates.
///
/// This is kept separate from [`Scalar`] so that the grid implementation can
/// use type-specific logic (e.g., Euclidean division for integers).
pub trait GridScalar: Scalar {
    /// Cell size used by [`GridConfig::default`][crate::GridConfig::default].
    const DEFAULT_CELL_SIZE: Self;

    /// Map a scalar coordinate to a grid coordinate along one axis.
    ///
    /// This is `floor((value - origin) / cell_size)`, rounding towards -∞ for
    /// negative values and saturating to the `i32` range. Implementations
    /// are monotonic in `value` for fixed `origin` and `cell_size`.
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32;

    /// Whether `cell_size` can be used to partition space.
    fn is_valid_cell_size(cell_size: Self) -> bool;
}

impl GridScalar for f32 {
    const DEFAULT_CELL_SIZE: Self = 64.0;

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f32)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }

    #[inline]
    fn is_valid_cell_size(cell_size: Self) -> bool {
        cell_size.is_finite() && cell_size > 0.0
    }
}

impl GridScalar for f64 {
    const DEFAULT_CELL_SIZE: Self = 64.0;

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0.0,
            "grid cell_size must be strictly positive (f64)"
        );
        let t = (value - origin) / cell_size;
        let coord = t as i32;

        // Round towards -∞ (the cast above has already truncated).
        if t < 0.0 && (coord as Self) > t {
            coord.saturating_sub(1)
        } else {
            coord
        }
    }

    #[inline]
    fn is_valid_cell_size(cell_size: Self) -> bool {
        cell_size.is_finite() && cell_size > 0.0
    }
}

impl GridScalar for i64 {
    const DEFAULT_CELL_SIZE: Self = 64;

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Grid cell indices are intentionally i32; out-of-range values are saturated."
    )]
    #[inline]
    fn cell_coord(value: Self, origin: Self, cell_size: Self) -> i32 {
        debug_assert!(
            cell_size > 0,
            "grid cell_size must be strictly positive (i64)"
        );
        let rel = value.saturating_sub(origin);
        // Euclidean division rounds toward -∞, which matches floor for all
        // integer values.
        let coord = rel.div_euclid(cell_size);

        if coord >= Self::from(i32::MAX) {
            i32::MAX
        } else if coord <= Self::from(i32::MIN) {
            i32::MIN
        } else {
            coord as i32
        }
    }

    #[inline]
    fn is_valid_cell_size(cell_size: Self) -> bool {
        cell_size > 0
    }
}

/// Integer coordinate of a grid cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl CellCoord {
    /// Create a cell coordinate.
    #[inline(always)]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for CellCoord {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle of cell coordinates.
///
/// `min` is component-wise less than or equal to `max`, so a range always
/// covers at least one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    min: CellCoord,
    max: CellCoord,
}

impl CellRange {
    /// The range spanning two corner cells, in any order.
    pub fn new(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: CellCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A range covering a single cell.
    #[inline]
    pub const fn single(cell: CellCoord) -> Self {
        Self {
            min: cell,
            max: cell,
        }
    }

    /// Lowest corner (inclusive).
    #[inline]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Highest corner (inclusive).
    #[inline]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Number of columns covered.
    #[allow(
        clippy::cast_sign_loss,
        reason = "max >= min is a type invariant, so the span is positive."
    )]
    #[inline]
    pub fn width(&self) -> u64 {
        (i64::from(self.max.x) - i64::from(self.min.x) + 1) as u64
    }

    /// Number of rows covered.
    #[allow(
        clippy::cast_sign_loss,
        reason = "max >= min is a type invariant, so the span is positive."
    )]
    #[inline]
    pub fn height(&self) -> u64 {
        (i64::from(self.max.y) - i64::from(self.min.y) + 1) as u64
    }

    /// Number of cells covered. Saturates for ranges larger than `u64`.
    #[inline]
    pub fn len(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }

    /// Always false: a range covers at least one cell.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `cell` lies within the range.
    #[inline]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.min.x <= cell.x && cell.x <= self.max.x && self.min.y <= cell.y && cell.y <= self.max.y
    }

    /// Whether two ranges share at least one cell.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Iterate the covered cells row by row.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + Clone + use<> {
        let (x0, x1) = (self.min.x, self.max.x);
        (self.min.y..=self.max.y).flat_map(move |y| (x0..=x1).map(move |x| CellCoord::new(x, y)))
    }
}

/// Converts world coordinates into cell coordinates for a fixed cell size and origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellMapper<T> {
    cell_size: T,
    origin_x: T,
    origin_y: T,
}

impl<T: GridScalar> CellMapper<T> {
    /// Create a mapper. `cell_size` must already be validated.
    pub(crate) fn new(cell_size: T, origin_x: T, origin_y: T) -> Self {
        debug_assert!(
            T::is_valid_cell_size(cell_size),
            "cell_size must be strictly positive"
        );
        Self {
            cell_size,
            origin_x,
            origin_y,
        }
    }

    /// Side length of a cell in world units.
    #[inline]
    pub fn cell_size(&self) -> T {
        self.cell_size
    }

    /// World position of the corner of cell `(0, 0)`.
    #[inline]
    pub fn origin(&self) -> (T, T) {
        (self.origin_x, self.origin_y)
    }

    /// The cell containing the point `(x, y)`.
    #[inline]
    pub fn cell_of(&self, x: T, y: T) -> CellCoord {
        CellCoord::new(
            T::cell_coord(x, self.origin_x, self.cell_size),
            T::cell_coord(y, self.origin_y, self.cell_size),
        )
    }

    /// The inclusive range of cells overlapping `aabb`.
    ///
    /// Degenerate boxes cover exactly one cell. An inverted axis collapses to
    /// the cell containing the box's minimum corner on that axis.
    pub fn covered_range(&self, aabb: &Aabb2D<T>) -> CellRange {
        let min = self.cell_of(aabb.min_x, aabb.min_y);
        let max = self.cell_of(aabb.max_x, aabb.max_y);
        CellRange {
            min,
            max: CellCoord::new(max.x.max(min.x), max.y.max(min.y)),
        }
    }
}
