// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time grid configuration.

use crate::coord::GridScalar;
use crate::error::{GridError, GridResult};
use crate::types::Scalar;

/// Parameters fixed for the lifetime of a grid.
///
/// Changing any of these means building a new grid and re-inserting every
/// object; there is no in-place resize.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig<T> {
    /// Side length of a cell in world units. Must be strictly positive.
    pub cell_size: T,
    /// World x of the corner of cell `(0, 0)`.
    pub origin_x: T,
    /// World y of the corner of cell `(0, 0)`.
    pub origin_y: T,
}

impl<T: GridScalar> Default for GridConfig<T> {
    fn default() -> Self {
        Self::with_cell_size(T::DEFAULT_CELL_SIZE)
    }
}

impl<T: GridScalar> GridConfig<T> {
    /// A grid of `cell_size` cells anchored at the world origin.
    pub fn with_cell_size(cell_size: T) -> Self {
        Self {
            cell_size,
            origin_x: T::zero(),
            origin_y: T::zero(),
        }
    }

    /// Pick a cell size for objects whose largest dimension is about `extent`.
    ///
    /// Cells twice the typical object size keep most objects within one to
    /// four cells while holding cell populations near 10–20 for dense worlds.
    pub fn for_object_extent(extent: T) -> Self {
        Self::with_cell_size(T::add(extent, extent))
    }

    /// Move the corner of cell `(0, 0)`.
    #[must_use]
    pub fn with_origin(mut self, origin_x: T, origin_y: T) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }

    /// Check that the configuration describes a usable partition.
    pub fn validate(&self) -> GridResult<()> {
        if T::is_valid_cell_size(self.cell_size) {
            Ok(())
        } else {
            Err(GridError::InvalidCellSize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_64_units_at_origin() {
        let c = GridConfig::<f32>::default();
        assert_eq!(c.cell_size, 64.0);
        assert_eq!((c.origin_x, c.origin_y), (0.0, 0.0));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn object_extent_doubles() {
        assert_eq!(GridConfig::<i64>::for_object_extent(16).cell_size, 32);
        let c = GridConfig::for_object_extent(12.5_f64).with_origin(-100.0, 40.0);
        assert_eq!(c.cell_size, 25.0);
        assert_eq!((c.origin_x, c.origin_y), (-100.0, 40.0));
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        assert_eq!(
            GridConfig::with_cell_size(0.0_f32).validate(),
            Err(GridError::InvalidCellSize)
        );
        assert_eq!(
            GridConfig::with_cell_size(-8_i64).validate(),
            Err(GridError::InvalidCellSize)
        );
        assert_eq!(
            GridConfig::with_cell_size(f64::NAN).validate(),
            Err(GridError::InvalidCellSize)
        );
    }
}
