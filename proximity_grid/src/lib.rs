// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proximity Grid: a sparse uniform hash grid for broad-phase proximity queries.
//!
//! The grid partitions 2D space into fixed-size square cells and records, for
//! each tracked object, every cell its bounding box overlaps. Region, circle and
//! single-cell queries then touch only the cells under the query, so their cost
//! follows the queried area rather than the number of tracked objects.
//!
//! - Insert, update, and remove bounding boxes keyed by your own handle type.
//! - Query by rectangle, circle, point, or cell coordinate.
//! - Cells that hold nothing are never allocated.
//!
//! Queries are broad-phase. They never miss an object whose box touches the
//! query, but may return objects that only share a cell with it; apply your
//! own exact test to the candidates.
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for configuration and plain data types.
//! - `kurbo`: conversions from `kurbo` shapes plus narrow-phase helpers in
//!   the `geom` module.
//!
//! # Example
//!
//! ```rust
//! use proximity_grid::{Aabb2D, CellCoord, HashGrid};
//!
//! let mut grid = HashGrid::<f32, u32>::new(64.0)?;
//! grid.insert(1, Aabb2D::new(0.0, 0.0, 10.0, 10.0));
//! grid.insert(2, Aabb2D::new(60.0, 60.0, 70.0, 70.0));
//!
//! // Object 2 spans four cells but is reported once.
//! let mut hits = grid.query_region(Aabb2D::new(0.0, 0.0, 128.0, 128.0));
//! hits.sort_unstable();
//! assert_eq!(hits, [1, 2]);
//!
//! assert_eq!(grid.query_cell(CellCoord::new(1, 1)), &[2]);
//! assert!(grid.query_circle(500.0, 500.0, 20.0).is_empty());
//! # Ok::<(), proximity_grid::GridError>(())
//! ```
//!
//! When the grid should also own per-object data, [`SpatialWorld`] pairs it
//! with a generational slot arena:
//!
//! ```rust
//! use proximity_grid::{Aabb2D, SpatialWorld};
//!
//! let mut world = SpatialWorld::<f64, &str>::with_cell_size(32.0)?;
//! let bush = world.insert(Aabb2D::from_xywh(10.0, 10.0, 8.0, 8.0), "berry bush");
//!
//! let near: Vec<_> = world.query_circle(12.0, 12.0, 16.0);
//! assert_eq!(near, [(bush, &"berry bush")]);
//!
//! world.remove(bush);
//! assert!(!world.is_live(bush));
//! # Ok::<(), proximity_grid::GridError>(())
//! ```
//!
//! ## Choosing a cell size
//!
//! Start at roughly twice the largest dimension of a typical object, see
//! [`GridConfig::for_object_extent`], then watch [`HashGrid::stats`]: a mean
//! occupancy around 10–20 handles per active cell is a good balance between
//! cell count and per-cell scanning. The cell size cannot change after
//! construction; build a new grid and re-insert instead.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Debug builds may assert.

#![no_std]

extern crate alloc;

mod cells;
mod config;
mod coord;
mod error;
#[cfg(feature = "kurbo")]
pub mod geom;
mod grid;
mod types;
mod world;

pub use cells::CellMap;
pub use config::GridConfig;
pub use coord::{CellCoord, CellMapper, CellRange, GridScalar};
pub use error::{GridError, GridResult};
pub use grid::{
    GridStats, HashGrid, HashGridF32, HashGridF64, HashGridI64, InsertOutcome, QueryCost,
};
pub use types::{Aabb2D, Scalar};
pub use world::{Key, SpatialWorld};
